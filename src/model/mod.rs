mod block;
mod database;
mod page;
mod settings;
mod template;

pub use block::*;
pub use database::*;
pub use page::*;
pub use settings::*;
pub use template::*;

use uuid::Uuid;

/// Fresh process-wide unique id such as `block_3f2a…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_prefixed_and_unique() {
        let a = new_id("page");
        let b = new_id("page");
        assert!(a.starts_with("page_"));
        assert_ne!(a, b);
    }
}
