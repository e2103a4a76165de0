//! 教学目录：课程、学科、班级
pub mod entities;
pub mod requests;
pub mod responses;
