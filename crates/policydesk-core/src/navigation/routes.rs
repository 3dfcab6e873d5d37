//! Static screen and tab layout of each navigation tree.

use serde::{Deserialize, Serialize};

use super::NavigationTree;

/// A screen the presentation layer can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Screen {
    Onboarding,
    Login,
    Register,
    HomeMain,
    CreateReport,
    TrackReports,
    Quote,
    ProfileMain,
    EditProfile,
    MyVehicles,
    Policies,
    AdminDashboard,
    AdminUsersList,
    AdminRegister,
    AdminClaims,
}

/// Bottom tab in an authenticated tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Tab {
    Home,
    Quote,
    Profile,
    Users,
    Claims,
}

const UNAUTHENTICATED_STACK: &[Screen] = &[Screen::Onboarding, Screen::Login, Screen::Register];

const STANDARD_USER_TABS: &[Tab] = &[Tab::Home, Tab::Quote, Tab::Profile];

const ADMIN_TABS: &[Tab] = &[Tab::Home, Tab::Users, Tab::Claims, Tab::Profile];

impl Screen {
    /// Stable identifier for the screen, the same string it serializes to.
    /// Front-ends keep their own mapping onto navigator route names.
    pub fn route_name(&self) -> &'static str {
        match self {
            Screen::Onboarding => "Onboarding",
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::HomeMain => "HomeMain",
            Screen::CreateReport => "CreateReport",
            Screen::TrackReports => "TrackReports",
            Screen::Quote => "Quote",
            Screen::ProfileMain => "ProfileMain",
            Screen::EditProfile => "EditProfile",
            Screen::MyVehicles => "MyVehicles",
            Screen::Policies => "Policies",
            Screen::AdminDashboard => "AdminDashboard",
            Screen::AdminUsersList => "AdminUsersList",
            Screen::AdminRegister => "AdminRegister",
            Screen::AdminClaims => "AdminClaims",
        }
    }
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Quote => "Quote",
            Tab::Profile => "Profile",
            Tab::Users => "Users",
            Tab::Claims => "Claims",
        }
    }

    /// Next tab in `tree`'s tab bar, wrapping around.
    /// `None` if the tab is not part of that tree.
    pub fn next_in(&self, tree: NavigationTree) -> Option<Tab> {
        let tabs = tree.tabs();
        let pos = tabs.iter().position(|t| t == self)?;
        Some(tabs[(pos + 1) % tabs.len()])
    }

    /// Previous tab in `tree`'s tab bar, wrapping around.
    pub fn prev_in(&self, tree: NavigationTree) -> Option<Tab> {
        let tabs = tree.tabs();
        let pos = tabs.iter().position(|t| t == self)?;
        Some(tabs[(pos + tabs.len() - 1) % tabs.len()])
    }
}

impl NavigationTree {
    /// Tab bar of the tree; empty for the unauthenticated stack
    pub fn tabs(&self) -> &'static [Tab] {
        match self {
            NavigationTree::Unauthenticated => &[],
            NavigationTree::StandardUser => STANDARD_USER_TABS,
            NavigationTree::Admin => ADMIN_TABS,
        }
    }

    /// Screens stacked under `tab` in this tree, first one is the tab's root.
    /// Empty if the tree has no such tab.
    pub fn tab_screens(&self, tab: Tab) -> &'static [Screen] {
        match (*self, tab) {
            (NavigationTree::StandardUser, Tab::Home) => {
                &[Screen::HomeMain, Screen::CreateReport, Screen::TrackReports]
            }
            (NavigationTree::StandardUser, Tab::Quote) => &[Screen::Quote],
            (NavigationTree::StandardUser, Tab::Profile) => &[
                Screen::ProfileMain,
                Screen::EditProfile,
                Screen::MyVehicles,
                Screen::Policies,
            ],
            (NavigationTree::Admin, Tab::Home) => &[Screen::AdminDashboard],
            (NavigationTree::Admin, Tab::Users) => &[Screen::AdminUsersList, Screen::AdminRegister],
            (NavigationTree::Admin, Tab::Claims) => &[Screen::AdminClaims],
            (NavigationTree::Admin, Tab::Profile) => &[Screen::ProfileMain],
            _ => &[],
        }
    }

    /// Every screen reachable in this tree, in registration order
    pub fn screens(&self) -> Vec<Screen> {
        match self {
            NavigationTree::Unauthenticated => UNAUTHENTICATED_STACK.to_vec(),
            _ => self
                .tabs()
                .iter()
                .flat_map(|tab| self.tab_screens(*tab).iter().copied())
                .collect(),
        }
    }

    /// Screen shown right after the tree is mounted
    pub fn initial_screen(&self) -> Screen {
        match self {
            NavigationTree::Unauthenticated => Screen::Onboarding,
            NavigationTree::StandardUser => Screen::HomeMain,
            NavigationTree::Admin => Screen::AdminDashboard,
        }
    }

    pub fn contains(&self, screen: Screen) -> bool {
        self.screens().contains(&screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_stack() {
        let tree = NavigationTree::Unauthenticated;
        assert!(tree.tabs().is_empty());
        assert_eq!(tree.initial_screen(), Screen::Onboarding);
        assert_eq!(tree.screens(), vec![Screen::Onboarding, Screen::Login, Screen::Register]);
        assert!(!tree.contains(Screen::HomeMain));
    }

    #[test]
    fn test_initial_screen_is_first_screen() {
        for tree in [NavigationTree::Unauthenticated, NavigationTree::StandardUser, NavigationTree::Admin] {
            assert_eq!(tree.screens().first().copied(), Some(tree.initial_screen()));
        }
    }

    #[test]
    fn test_admin_screens_stay_in_admin_tree() {
        let user = NavigationTree::StandardUser;
        let admin = NavigationTree::Admin;
        for screen in [Screen::AdminDashboard, Screen::AdminUsersList, Screen::AdminRegister, Screen::AdminClaims] {
            assert!(admin.contains(screen));
            assert!(!user.contains(screen));
        }
        // Profile root is shared
        assert!(user.contains(Screen::ProfileMain));
        assert!(admin.contains(Screen::ProfileMain));
        // Quoting is a standard-user feature
        assert!(!admin.contains(Screen::Quote));
    }

    #[test]
    fn test_tab_screens_outside_tree() {
        assert!(NavigationTree::StandardUser.tab_screens(Tab::Claims).is_empty());
        assert!(NavigationTree::Admin.tab_screens(Tab::Quote).is_empty());
        assert!(NavigationTree::Unauthenticated.tab_screens(Tab::Home).is_empty());
    }

    #[test]
    fn test_tab_next() {
        let tree = NavigationTree::Admin;
        assert_eq!(Tab::Home.next_in(tree), Some(Tab::Users));
        assert_eq!(Tab::Users.next_in(tree), Some(Tab::Claims));
        assert_eq!(Tab::Claims.next_in(tree), Some(Tab::Profile));
        assert_eq!(Tab::Profile.next_in(tree), Some(Tab::Home)); // Wraps around
        assert_eq!(Tab::Quote.next_in(tree), None);
    }

    #[test]
    fn test_tab_prev() {
        let tree = NavigationTree::StandardUser;
        assert_eq!(Tab::Home.prev_in(tree), Some(Tab::Profile)); // Wraps around
        assert_eq!(Tab::Profile.prev_in(tree), Some(Tab::Quote));
        assert_eq!(Tab::Quote.prev_in(tree), Some(Tab::Home));
        assert_eq!(Tab::Home.prev_in(NavigationTree::Unauthenticated), None);
    }

    #[test]
    fn test_route_name_matches_serialized_form() {
        for tree in [NavigationTree::Unauthenticated, NavigationTree::StandardUser, NavigationTree::Admin] {
            for screen in tree.screens() {
                assert_eq!(
                    serde_json::to_string(&screen).unwrap(),
                    format!("\"{}\"", screen.route_name())
                );
            }
        }
    }

    #[test]
    fn test_route_names_unique() {
        let mut names: Vec<&str> = [NavigationTree::Unauthenticated, NavigationTree::StandardUser, NavigationTree::Admin]
            .iter()
            .flat_map(|t| t.screens())
            .map(|s| s.route_name())
            .collect();
        names.sort_unstable();
        names.dedup();
        // ProfileMain is registered in both authenticated trees
        assert_eq!(names.len(), 15);
    }
}
