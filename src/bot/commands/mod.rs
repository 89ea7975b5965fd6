pub mod consultation;
pub mod groups;
pub mod help;
pub mod publish;
pub mod roles;
pub mod start;
