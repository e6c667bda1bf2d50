use std::sync::Arc;

use gatehouse_api::prelude::{ApiAdapter, ApiDescriptor, PathValues};

use crate::errors::DispatchError;
use crate::handler::HandlerObject;

pub struct Route {
    pub api: Arc<ApiDescriptor>,
    pub adapter: Arc<dyn ApiAdapter>,
    pub handler: HandlerObject,
}

/// Append-only route registry. Routes are evaluated linearly in
/// registration order and the first path match wins, so earlier routes
/// shadow later overlapping ones.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        api: ApiDescriptor,
        adapter: Arc<dyn ApiAdapter>,
        handler: HandlerObject,
    ) -> Result<(), DispatchError> {
        if api.methods.is_empty() {
            return Err(DispatchError::registration("empty methods not allowed"));
        }
        if api.methods.iter().any(|m| m.eq_ignore_ascii_case("OPTIONS")) {
            return Err(DispatchError::registration("can't register OPTIONS method"));
        }

        self.routes.push(Route {
            api: Arc::new(api),
            adapter,
            handler,
        });
        Ok(())
    }

    /// First route whose template matches the path, regardless of method.
    /// The method decision happens after the match, so a matched path with
    /// a disallowed method still ends the scan.
    pub fn match_path(&self, path: &str) -> Option<(&Route, PathValues)> {
        let parts: Vec<&str> = path.split('/').skip(1).collect();
        self.routes.iter().find_map(|route| {
            route
                .api
                .template
                .match_segments(&parts)
                .map(|values| (route, values))
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
