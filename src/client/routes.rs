//! Route table and role-based UI controls

use crate::models::{Publishable, User, UserRole};

/// Who may open a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Pattern; `:name` segments match any single segment
    pub pattern: &'static str,
    pub title: &'static str,
    pub access: Access,
}

pub const ROUTES: &[Route] = &[
    Route { pattern: "/", title: "Artists", access: Access::Authenticated },
    Route { pattern: "/albums/:artist", title: "Albums", access: Access::Authenticated },
    Route { pattern: "/tracks/:album", title: "Tracks", access: Access::Authenticated },
    Route { pattern: "/register", title: "Sign up", access: Access::Public },
    Route { pattern: "/login", title: "Sign in", access: Access::Public },
    Route { pattern: "/track_history", title: "Track history", access: Access::Authenticated },
    Route { pattern: "/new_artist", title: "New artist", access: Access::Authenticated },
    Route { pattern: "/new_album", title: "New album", access: Access::Authenticated },
    Route { pattern: "/new_track", title: "New track", access: Access::Authenticated },
    Route { pattern: "/profile", title: "Profile", access: Access::Authenticated },
    Route { pattern: "/unpublished", title: "Unpublished", access: Access::Admin },
];

/// Outcome of opening a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(&'static Route),
    /// Needs a session first
    Login,
    Forbidden,
    NotFound,
}

impl Route {
    pub fn matches(&self, path: &str) -> bool {
        let mut pattern = self.pattern.split('/').filter(|s| !s.is_empty());
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        loop {
            match (pattern.next(), segments.next()) {
                (None, None) => return true,
                (Some(p), Some(_)) if p.starts_with(':') => {}
                (Some(p), Some(s)) if p == s => {}
                _ => return false,
            }
        }
    }

    pub fn allows(&self, user: Option<&User>) -> bool {
        match self.access {
            Access::Public => true,
            Access::Authenticated => user.is_some(),
            Access::Admin => user.is_some_and(User::is_admin),
        }
    }
}

/// Resolve a path against the route table for the current session
pub fn navigate(path: &str, user: Option<&User>) -> Navigation {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let Some(route) = ROUTES.iter().find(|r| r.matches(path)) else {
        return Navigation::NotFound;
    };

    match (route.allows(user), user) {
        (true, _) => Navigation::Render(route),
        (false, None) => Navigation::Login,
        (false, Some(_)) => Navigation::Forbidden,
    }
}

/// Which mutating controls a page shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    /// "New artist/album/track" buttons
    pub create: bool,
    pub delete: bool,
    pub toggle_publish: bool,
    /// Unpublished entries are shown (with a badge) rather than hidden
    pub show_unpublished: bool,
}

impl Controls {
    pub fn for_user(user: Option<&User>) -> Self {
        match user.map(|u| u.role) {
            None => Controls::default(),
            Some(UserRole::User) => Controls {
                create: true,
                ..Controls::default()
            },
            Some(UserRole::Admin) => Controls {
                create: true,
                delete: true,
                toggle_publish: true,
                show_unpublished: true,
            },
        }
    }

    /// Entries a page should render
    pub fn visible<'a, T: Publishable>(&self, items: &'a [T]) -> impl Iterator<Item = &'a T> {
        let show_unpublished = self.show_unpublished;
        items
            .iter()
            .filter(move |item| show_unpublished || item.is_published())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Artist;

    fn user(role: UserRole) -> User {
        let mut user = User::new("u".into(), String::new(), "U".into());
        user.role = role;
        user
    }

    #[test]
    fn test_matching() {
        let albums = ROUTES.iter().find(|r| r.title == "Albums").unwrap();

        assert!(albums.matches("/albums/Miles%20Davis"));
        assert!(albums.matches("/albums/x/"));
        assert!(!albums.matches("/albums"));
        assert!(!albums.matches("/albums/x/y"));
        assert!(ROUTES[0].matches("/"));
        assert!(!ROUTES[0].matches("/login"));
    }

    #[test]
    fn test_navigation_by_role() {
        let regular = user(UserRole::User);
        let admin = user(UserRole::Admin);

        // every listing needs a session
        assert_eq!(navigate("/", None), Navigation::Login);
        assert!(matches!(navigate("/", Some(&regular)), Navigation::Render(r) if r.title == "Artists"));
        assert!(matches!(navigate("/login", None), Navigation::Render(_)));
        assert_eq!(navigate("/new_album", None), Navigation::Login);
        assert!(matches!(navigate("/new_album", Some(&regular)), Navigation::Render(_)));
        assert!(matches!(navigate("/tracks/3?play=1", Some(&regular)), Navigation::Render(r) if r.title == "Tracks"));

        assert_eq!(navigate("/unpublished", None), Navigation::Login);
        assert_eq!(navigate("/unpublished", Some(&regular)), Navigation::Forbidden);
        assert!(matches!(navigate("/unpublished", Some(&admin)), Navigation::Render(_)));

        assert_eq!(navigate("/nowhere", Some(&admin)), Navigation::NotFound);
    }

    #[test]
    fn test_controls() {
        assert_eq!(Controls::for_user(None), Controls::default());

        let regular = Controls::for_user(Some(&user(UserRole::User)));
        assert!(regular.create);
        assert!(!regular.delete && !regular.toggle_publish && !regular.show_unpublished);

        let admin = Controls::for_user(Some(&user(UserRole::Admin)));
        assert!(admin.create && admin.delete && admin.toggle_publish && admin.show_unpublished);
    }

    #[test]
    fn test_visible_entries() {
        let artist = |id, is_published| Artist {
            id,
            name: format!("a{}", id),
            photo: None,
            information: None,
            is_published,
        };
        let artists = vec![artist(1, true), artist(2, false)];

        let regular = Controls::for_user(Some(&user(UserRole::User)));
        let ids: Vec<_> = regular.visible(&artists).map(|a| a.id).collect();
        assert_eq!(ids, vec![1]);

        let admin = Controls::for_user(Some(&user(UserRole::Admin)));
        assert_eq!(admin.visible(&artists).count(), 2);
    }
}
