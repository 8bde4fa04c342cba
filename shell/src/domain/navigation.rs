//! Side menu entries per role.

use serde::Serialize;

use super::Role;

/// One link in the side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn item(label: &'static str, path: &'static str) -> MenuItem {
    MenuItem { label, path }
}

const CUSTOMER_MENU: &[MenuItem] = &[
    item("Dashboard", "/customer/dashboard"),
    item("Find Services", "/customer/search"),
    item("My Bookings", "/customer/bookings"),
    item("Messages", "/messages"),
    item("Wallet", "/wallet"),
    item("Reviews", "/customer/reviews"),
    item("Settings", "/profile"),
];

const SERVICE_PROVIDER_MENU: &[MenuItem] = &[
    item("Dashboard", "/service-provider/dashboard"),
    item("My Jobs", "/service-provider/jobs"),
    item("Profile", "/service-provider/profile"),
    item("Portfolio", "/service-provider/portfolio"),
    item("Messages", "/messages"),
    item("Earnings", "/service-provider/earnings"),
    item("Reviews", "/service-provider/reviews"),
    item("Settings", "/profile"),
];

const ADMIN_MENU: &[MenuItem] = &[
    item("Dashboard", "/admin/dashboard"),
    item("Users", "/admin/users"),
    item("Bookings", "/admin/bookings"),
    item("Analytics", "/admin/analytics"),
    item("Payments", "/admin/payments"),
    item("Disputes", "/admin/disputes"),
    item("Settings", "/admin/settings"),
];

/// Menu shown to `role`. Both admin tiers share one menu.
pub fn menu_for(role: Role) -> &'static [MenuItem] {
    match role {
        Role::Customer => CUSTOMER_MENU,
        Role::ServiceProvider => SERVICE_PROVIDER_MENU,
        Role::Admin | Role::SuperAdmin => ADMIN_MENU,
    }
}

/// Heading above the menu.
pub fn panel_title(role: Role) -> &'static str {
    match role {
        Role::Customer => "Customer Panel",
        Role::ServiceProvider => "Service Provider Panel",
        Role::Admin | Role::SuperAdmin => "Admin Panel",
    }
}

/// Whether `item` should be highlighted while `current` is shown.
pub fn is_active(item: &MenuItem, current: &str) -> bool {
    item.path == current.strip_suffix('/').filter(|rest| !rest.is_empty()).unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Access, resolve};
    use rstest::rstest;

    const ALL_ROLES: [Role; 4] = [
        Role::Customer,
        Role::ServiceProvider,
        Role::Admin,
        Role::SuperAdmin,
    ];

    #[rstest]
    fn every_menu_starts_at_the_role_home() {
        for role in ALL_ROLES {
            assert_eq!(menu_for(role).first().map(|item| item.path), Some(role.home_path()));
        }
    }

    #[rstest]
    fn menu_links_are_routes_the_role_may_open() {
        for role in ALL_ROLES {
            for item in menu_for(role) {
                let entry = resolve(item.path).expect("menu link is a route");
                let allowed = match entry.access {
                    Access::Public | Access::Authenticated | Access::RoleHome => true,
                    Access::Role(requirement) => requirement.admits(role),
                };
                assert!(allowed, "{role} cannot open {}", item.path);
            }
        }
    }

    #[rstest]
    fn admin_tiers_share_a_menu() {
        assert_eq!(menu_for(Role::Admin), menu_for(Role::SuperAdmin));
        assert_eq!(panel_title(Role::SuperAdmin), "Admin Panel");
    }

    #[rstest]
    #[case("/wallet", true)]
    #[case("/wallet/", true)]
    #[case("/wallet/history", false)]
    fn highlights_exact_path(#[case] current: &str, #[case] active: bool) {
        assert_eq!(is_active(&item("Wallet", "/wallet"), current), active);
    }
}
