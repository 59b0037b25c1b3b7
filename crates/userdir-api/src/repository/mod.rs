//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러와 서비스에서 분리하여
//! 관리합니다. 모든 Repository는 static methods 패턴을 사용합니다.

pub mod roles;
pub mod users;

pub use roles::{RoleRecord, RoleRepository};
pub use users::{
    AdminUserUpdate, NewUser, Pagination, SortField, SortOrder, UserChanges, UserRecord,
    UserRepository, UserUpdate, UserView,
};
