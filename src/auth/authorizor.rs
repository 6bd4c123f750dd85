use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::Driver;
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class())?;
    o.register_class(User::get_polar_class())?;
    o.register_class(Driver::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewDriver;
    use chrono::Utc;

    fn user(id: &str, roles: &[&str]) -> User {
        User {
            id: id.into(),
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }

    fn driver(id: &str) -> Driver {
        let form = NewDriver {
            id: id.into(),
            name: "Alex Ray".into(),
        };
        Driver::new(form, "driver-1".into(), Utc::now())
    }

    #[test]
    fn admin_and_system_may_do_anything() {
        let authorizor = new().unwrap();

        for actor in [user("ADM-001", &["admin"]), User::new_system_user()] {
            let result = authorizor.is_allowed(actor.clone(), "create_driver", Platform::default());
            assert_eq!(result.unwrap(), true);

            let result = authorizor.is_allowed(actor.clone(), "update_status", driver("DRI-001"));
            assert_eq!(result.unwrap(), true);
        }
    }

    #[test]
    fn platform_actions_need_a_privileged_role() {
        let authorizor = new().unwrap();

        for action in ["list_drivers", "subscribe_drivers", "edit_driver_location"] {
            let result = authorizor.is_allowed(user("ADM-001", &["admin"]), action, Platform);
            assert_eq!(result.unwrap(), true);

            let result = authorizor.is_allowed(user("DRI-001", &["driver"]), action, Platform);
            assert_eq!(result.unwrap(), false);
        }
    }

    #[test]
    fn driver_may_act_on_own_record() {
        let authorizor = new().unwrap();
        let me = user("DRI-001", &["driver"]);

        for action in ["read", "report_location", "update_status"] {
            let result = authorizor.is_allowed(me.clone(), action, driver("DRI-001"));
            assert_eq!(result.unwrap(), true);
        }
    }

    #[test]
    fn driver_may_not_act_on_others() {
        let authorizor = new().unwrap();
        let me = user("DRI-001", &["driver"]);

        let result = authorizor.is_allowed(me.clone(), "read", driver("DRI-002"));
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(me.clone(), "report_location", driver("DRI-002"));
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(me.clone(), "create_driver", Platform::default());
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(me, "analyze_route", Platform::default());
        assert_eq!(result.unwrap(), false);
    }
}
