//! In-memory repository implementation.
//!
//! Backs unit tests and local development runs. State lives behind a single
//! `parking_lot::RwLock`; locks are never held across an await point.

use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;

use async_trait::async_trait;

use crate::api::{CourseId, LeaveStatus, StudentId, UserId};
use crate::db::models::{
    AttendanceEntry, Course, LeaveRequest, NewAttendanceRecord, NewCourse, NewLeaveRequest,
    NewReferenceBook, NewResult, NewSubject, NewUser, ReferenceBook, ResultEntry, Student,
    StudentProfile, Subject, User,
};
use crate::db::repository::{
    AttendanceRepository, CourseRepository, FullRepository, LeaveRepository,
    ReferenceBookRepository, RepositoryError, RepositoryResult, ResultRepository,
    SubjectRepository, UserRepository,
};

/// Raw attendance row as stored (the trait returns a joined view).
#[derive(Debug, Clone)]
struct AttendanceRow {
    id: i64,
    date: NaiveDate,
    course_id: Option<CourseId>,
    student_id: StudentId,
    status: String,
}

/// Raw result row as stored.
#[derive(Debug, Clone)]
struct ResultRow {
    id: i64,
    student_id: StudentId,
    subject_name: String,
    ia1: i32,
    ia2: i32,
    ia3: i32,
    attendance: i32,
}

#[derive(Debug, Default)]
struct Store {
    courses: Vec<Course>,
    users: Vec<User>,
    students: Vec<Student>,
    attendance: Vec<AttendanceRow>,
    results: Vec<ResultRow>,
    subjects: Vec<Subject>,
    leaves: Vec<LeaveRequest>,
    books: Vec<ReferenceBook>,
    next_id: i64,
}

impl Store {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    fn course_label(&self, id: Option<CourseId>) -> String {
        id.and_then(|id| self.course(id))
            .map(Course::label)
            .unwrap_or_default()
    }

    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    fn student_name(&self, id: StudentId) -> Option<String> {
        self.student(id)
            .and_then(|s| self.user(s.user_id))
            .map(|u| u.full_name.clone())
    }

    fn profile(&self, student: &Student) -> Option<StudentProfile> {
        let user = self.user(student.user_id)?;
        Some(StudentProfile {
            student_id: student.id,
            user_id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            course_label: self.course_label(student.course_id),
        })
    }

    fn result_entry(&self, row: &ResultRow) -> ResultEntry {
        ResultEntry {
            id: row.id,
            student_id: row.student_id,
            student_name: self.student_name(row.student_id),
            subject_name: row.subject_name.clone(),
            ia1: row.ia1,
            ia2: row.ia2,
            ia3: row.ia3,
            attendance: row.attendance,
        }
    }
}

/// In-memory implementation of [`FullRepository`].
#[derive(Debug, Default)]
pub struct LocalRepository {
    inner: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for LocalRepository {
    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        let store = self.inner.read();
        let mut courses = store.courses.clone();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn get_course(&self, id: CourseId) -> RepositoryResult<Option<Course>> {
        Ok(self.inner.read().course(id).cloned())
    }

    async fn find_course_by_name(&self, name: &str) -> RepositoryResult<Option<Course>> {
        let store = self.inner.read();
        Ok(store.courses.iter().find(|c| c.name == name).cloned())
    }

    async fn find_course_by_name_or_code(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<Course>> {
        let store = self.inner.read();
        Ok(store
            .courses
            .iter()
            .find(|c| c.name == reference || c.code.as_deref() == Some(reference))
            .cloned())
    }

    async fn insert_course(&self, new: NewCourse) -> RepositoryResult<Course> {
        let mut store = self.inner.write();
        if store.courses.iter().any(|c| c.name == new.name) {
            return Err(RepositoryError::conflict(format!(
                "Course name '{}' already exists",
                new.name
            )));
        }
        if let Some(ref code) = new.code {
            if store.courses.iter().any(|c| c.code.as_deref() == Some(code)) {
                return Err(RepositoryError::conflict(format!(
                    "Course code '{}' already exists",
                    code
                )));
            }
        }
        let id = store.alloc_id();
        let course = Course {
            id: CourseId::new(id),
            name: new.name,
            code: new.code,
        };
        store.courses.push(course.clone());
        Ok(course)
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.inner.read().user(id).cloned())
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> RepositoryResult<Option<User>> {
        let store = self.inner.read();
        Ok(store
            .users
            .iter()
            .find(|u| u.email == identifier || u.username.as_deref() == Some(identifier))
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let store = self.inner.read();
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> RepositoryResult<User> {
        let mut store = self.inner.write();
        if store.users.iter().any(|u| u.email == new.email) {
            return Err(RepositoryError::conflict(format!(
                "Email '{}' already registered",
                new.email
            )));
        }
        let id = store.alloc_id();
        let user = User {
            id: UserId::new(id),
            full_name: new.full_name,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            course_id: new.course_id,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn insert_student_user(
        &self,
        new: NewUser,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<(User, Student)> {
        let mut store = self.inner.write();
        if store.users.iter().any(|u| u.email == new.email) {
            return Err(RepositoryError::conflict(format!(
                "Email '{}' already registered",
                new.email
            )));
        }
        let user_id = store.alloc_id();
        let user = User {
            id: UserId::new(user_id),
            full_name: new.full_name,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            course_id: None,
        };
        let student_id = store.alloc_id();
        let student = Student {
            id: StudentId::new(student_id),
            user_id: user.id,
            course_id,
        };
        store.users.push(user.clone());
        store.students.push(student.clone());
        Ok((user, student))
    }

    async fn get_student(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        Ok(self.inner.read().student(id).cloned())
    }

    async fn student_for_user(&self, user_id: UserId) -> RepositoryResult<Option<Student>> {
        let store = self.inner.read();
        Ok(store.students.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn find_student_by_full_name(
        &self,
        full_name: &str,
    ) -> RepositoryResult<Option<Student>> {
        let store = self.inner.read();
        Ok(store
            .students
            .iter()
            .find(|s| {
                store
                    .user(s.user_id)
                    .map(|u| u.full_name == full_name)
                    .unwrap_or(false)
            })
            .cloned())
    }

    async fn get_student_profile(
        &self,
        id: StudentId,
    ) -> RepositoryResult<Option<StudentProfile>> {
        let store = self.inner.read();
        Ok(store.student(id).and_then(|s| store.profile(s)))
    }

    async fn list_students(
        &self,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<Vec<StudentProfile>> {
        let store = self.inner.read();
        Ok(store
            .students
            .iter()
            .filter(|s| course_id.is_none() || s.course_id == course_id)
            .filter_map(|s| store.profile(s))
            .collect())
    }
}

#[async_trait]
impl AttendanceRepository for LocalRepository {
    async fn replace_attendance(
        &self,
        date: NaiveDate,
        course_id: Option<CourseId>,
        records: Vec<NewAttendanceRecord>,
    ) -> RepositoryResult<usize> {
        let mut store = self.inner.write();
        store.attendance.retain(|r| {
            r.date != date || (course_id.is_some() && r.course_id != course_id)
        });
        let inserted = records.len();
        for rec in records {
            let id = store.alloc_id();
            store.attendance.push(AttendanceRow {
                id,
                date: rec.date,
                course_id: rec.course_id,
                student_id: rec.student_id,
                status: rec.status,
            });
        }
        Ok(inserted)
    }

    async fn list_attendance(
        &self,
        date: NaiveDate,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<Vec<AttendanceEntry>> {
        let store = self.inner.read();
        Ok(store
            .attendance
            .iter()
            .filter(|r| r.date == date)
            .filter(|r| course_id.is_none() || r.course_id == course_id)
            .map(|r| AttendanceEntry {
                id: r.id,
                date: r.date,
                course_label: store.course_label(r.course_id),
                student_id: r.student_id,
                student_name: store.student_name(r.student_id),
                status: r.status.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl ResultRepository for LocalRepository {
    async fn insert_result(&self, new: NewResult) -> RepositoryResult<ResultEntry> {
        let mut store = self.inner.write();
        let id = store.alloc_id();
        let row = ResultRow {
            id,
            student_id: new.student_id,
            subject_name: new.subject_name,
            ia1: new.ia1,
            ia2: new.ia2,
            ia3: new.ia3,
            attendance: new.attendance,
        };
        let entry = store.result_entry(&row);
        store.results.push(row);
        Ok(entry)
    }

    async fn list_results(
        &self,
        student_id: Option<StudentId>,
        student_name: Option<&str>,
    ) -> RepositoryResult<Vec<ResultEntry>> {
        let store = self.inner.read();
        let rows = store.results.iter().filter(|r| {
            if let Some(id) = student_id {
                r.student_id == id
            } else if let Some(name) = student_name {
                store.student_name(r.student_id).as_deref() == Some(name)
            } else {
                true
            }
        });
        Ok(rows.map(|r| store.result_entry(r)).collect())
    }
}

#[async_trait]
impl LeaveRepository for LocalRepository {
    async fn insert_leave_request(
        &self,
        new: NewLeaveRequest,
    ) -> RepositoryResult<LeaveRequest> {
        let mut store = self.inner.write();
        let id = store.alloc_id();
        let leave = LeaveRequest {
            id,
            student_id: new.student_id,
            reason: new.reason,
            from_date: new.from_date,
            to_date: new.to_date,
            status: LeaveStatus::Pending,
            created_at: Utc::now(),
        };
        store.leaves.push(leave.clone());
        Ok(leave)
    }

    async fn list_leave_requests(
        &self,
        student_id: Option<StudentId>,
    ) -> RepositoryResult<Vec<LeaveRequest>> {
        let store = self.inner.read();
        let mut leaves: Vec<LeaveRequest> = store
            .leaves
            .iter()
            .filter(|l| student_id.is_none() || Some(l.student_id) == student_id)
            .cloned()
            .collect();
        leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leaves)
    }
}

#[async_trait]
impl SubjectRepository for LocalRepository {
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let store = self.inner.read();
        let mut subjects = store.subjects.clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn insert_subject(&self, new: NewSubject) -> RepositoryResult<Subject> {
        let mut store = self.inner.write();
        let id = store.alloc_id();
        let subject = Subject {
            id,
            name: new.name,
            course_name: new.course_name,
            staff_name: new.staff_name,
            session_name: new.session_name,
        };
        store.subjects.push(subject.clone());
        Ok(subject)
    }

    async fn delete_subject(&self, id: i64) -> RepositoryResult<bool> {
        let mut store = self.inner.write();
        let before = store.subjects.len();
        store.subjects.retain(|s| s.id != id);
        Ok(store.subjects.len() < before)
    }
}

#[async_trait]
impl ReferenceBookRepository for LocalRepository {
    async fn insert_reference_book(
        &self,
        new: NewReferenceBook,
    ) -> RepositoryResult<ReferenceBook> {
        let mut store = self.inner.write();
        let id = store.alloc_id();
        let book = ReferenceBook {
            id,
            author: new.author,
            title: new.title,
            pdf_url: new.pdf_url,
            uploaded_by_id: new.uploaded_by_id,
            created_at: Utc::now(),
        };
        store.books.push(book.clone());
        Ok(book)
    }

    async fn list_reference_books(&self) -> RepositoryResult<Vec<ReferenceBook>> {
        let store = self.inner.read();
        let mut books = store.books.clone();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(books)
    }

    async fn delete_reference_book(&self, id: i64) -> RepositoryResult<bool> {
        let mut store = self.inner.write();
        let before = store.books.len();
        store.books.retain(|b| b.id != id);
        Ok(store.books.len() < before)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn ping(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
