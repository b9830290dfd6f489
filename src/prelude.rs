pub use crate::Dom;
pub use crate::Error;

pub use crate::assign::{Assign, AssignOptions, Assignment, ChildRef};
pub use crate::config::Config;
pub use crate::notify::{Notification, Notifier};
pub use crate::view::{View, ViewCore, ViewId};
