//! 人员：教师、学生、监护人
pub mod entities;
pub mod requests;
pub mod responses;
