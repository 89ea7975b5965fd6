pub mod callbacks;
pub mod commander;
pub mod commands;
pub mod dispatcher;
pub mod keyboards;
pub mod messager;
pub mod replies;
pub mod timeouts;
