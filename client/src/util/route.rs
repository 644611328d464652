//! Client-visible route table.
//!
//! Unmatched paths resolve to [`Route::Home`], mirroring the catch-all
//! redirect to `/`.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    PinDetail(i64),
    TagPins(String),
    Saved,
    Profile,
    Create,
}

impl Route {
    /// Resolve a path such as `/pin/12?x=1` to a route.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["saved"] => Self::Saved,
            ["profile"] => Self::Profile,
            ["create"] => Self::Create,
            ["pin", id] => id.parse().map_or(Self::Home, Self::PinDetail),
            ["tag", name] => match urlencoding::decode(name) {
                Ok(name) if !name.trim().is_empty() => Self::TagPins(name.into_owned()),
                _ => Self::Home,
            },
            _ => Self::Home,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::PinDetail(id) => format!("/pin/{id}"),
            Self::TagPins(name) => format!("/tag/{}", urlencoding::encode(name)),
            Self::Saved => "/saved".into(),
            Self::Profile => "/profile".into(),
            Self::Create => "/create".into(),
        }
    }

    /// Everything except the login and register screens needs a session.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
