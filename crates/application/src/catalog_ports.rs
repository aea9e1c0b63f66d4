mod groups;
mod principals;
mod privileges;
mod session;

pub use groups::{GroupMembers, GroupRepository};
pub use principals::PrincipalRepository;
pub use privileges::PrivilegeRepository;
pub use session::CatalogSession;
