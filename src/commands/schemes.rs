use crate::plugin::{IcgcGetProvision, ProvisionInterface};

pub fn list_schemes() {
    for scheme in IcgcGetProvision::new().schemes_handled() {
        println!("{scheme}");
    }
}
