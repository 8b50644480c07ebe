//! Route tree definition and validation.

use std::collections::HashSet;
use std::rc::Rc;

use thiserror::Error;

use crate::template::Template;

/// One level of the route tree.
///
/// `path` is a single segment such as `/tacos`; nesting is expressed through
/// `children`, which are matched against the remainder of the path inside the
/// view slot this route fills.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    path: String,
    element: Template,
    children: Rc<[Route]>,
}

impl Route {
    pub fn new(path: impl Into<String>, element: impl Into<Template>) -> Self {
        Self {
            path: path.into(),
            element: element.into(),
            children: Rc::from(Vec::new()),
        }
    }

    /// Set nested routes (builder).
    pub fn with_children(mut self, children: impl IntoIterator<Item = Route>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn element(&self) -> &Template {
        &self.element
    }

    pub fn children(&self) -> &[Route] {
        &self.children
    }
}

/// Problems in a route tree that make matching ambiguous or impossible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route path is empty")]
    EmptyPath,

    #[error("route path `{path}` spans more than one segment")]
    MultiSegment { path: String },

    #[error("route path `{path}` is declared more than once at the same level")]
    DuplicatePath { path: String },
}

/// Check a route tree for empty paths, multi-segment paths and duplicate
/// siblings. Reports the first problem found, depth first.
///
/// Resolution still works on an invalid tree; for duplicates the first
/// declared route wins.
pub fn validate_routes(routes: &[Route]) -> Result<(), RouteError> {
    let mut seen = HashSet::new();
    for route in routes {
        let segment = route.path.trim_start_matches('/');
        if route.path.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        if segment.contains('/') {
            return Err(RouteError::MultiSegment {
                path: route.path.clone(),
            });
        }
        if !seen.insert(segment) {
            return Err(RouteError::DuplicatePath {
                path: route.path.clone(),
            });
        }
        validate_routes(&route.children)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_children_in_order() {
        let route = Route::new("/contacts", "Contacts")
            .with_children([Route::new("/1", "one"), Route::new("/2", "two")]);
        let paths: Vec<&str> = route.children().iter().map(Route::path).collect();
        assert_eq!(paths, vec!["/1", "/2"]);
        assert_eq!(route.element(), &Template::text("Contacts"));
    }

    #[test]
    fn valid_tree_passes() {
        let routes = vec![
            Route::new("/", "home"),
            Route::new("/contacts", "contacts").with_children([
                Route::new("/", "pick one"),
                Route::new("/1", "one"),
            ]),
        ];
        assert_eq!(validate_routes(&routes), Ok(()));
    }

    #[test]
    fn reports_problems() {
        assert_eq!(
            validate_routes(&[Route::new("", "x")]),
            Err(RouteError::EmptyPath)
        );
        assert_eq!(
            validate_routes(&[Route::new("/a/b", "x")]),
            Err(RouteError::MultiSegment {
                path: "/a/b".to_owned()
            })
        );
        // `tacos` and `/tacos` match the same segment.
        let nested = Route::new("/menu", "menu")
            .with_children([Route::new("/tacos", "a"), Route::new("tacos", "b")]);
        assert_eq!(
            validate_routes(&[nested]),
            Err(RouteError::DuplicatePath {
                path: "tacos".to_owned()
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = RouteError::DuplicatePath {
            path: "/1".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "route path `/1` is declared more than once at the same level"
        );
    }
}
