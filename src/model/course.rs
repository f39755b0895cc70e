use serde::{Deserialize, Serialize};

/// A course a student can be enrolled in. Courses only surface through the
/// student joined read; there is no standalone course table access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_code: String,
    pub name: String,
    pub credits: i32,
}
