mod check_config;
mod create_admin;

pub use check_config::cmd_check_config;
pub use create_admin::cmd_create_admin;
