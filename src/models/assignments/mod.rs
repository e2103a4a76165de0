//! 教师-班级-学科任课关系
pub mod entities;
pub mod requests;
