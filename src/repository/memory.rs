//! In-memory repository over `parking_lot` guarded maps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::RwLock;

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{
    Course, DocumentJob, OperationLog, Student, StudentCourse, Template, TemplateType, Validate,
};

#[derive(Default)]
pub struct MemoryRepository {
    students: RwLock<HashMap<i64, Student>>,
    courses: RwLock<HashMap<String, Course>>,
    enrollments: RwLock<HashMap<i64, StudentCourse>>,
    templates: RwLock<Vec<Template>>,
    jobs: RwLock<HashMap<i64, DocumentJob>>,
    audit_log: RwLock<Vec<OperationLog>>,
    next_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    fn assign_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Repository for MemoryRepository {
    fn get_student(&self, id: i64) -> RepoResult<Student> {
        self.students
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("student", id))
    }

    fn list_students(&self) -> Vec<Student> {
        let mut students: Vec<Student> = self.students.read().values().cloned().collect();
        students.sort_by_key(|s| s.id);
        students
    }

    fn save_student(&self, student: &mut Student) -> RepoResult<()> {
        student
            .validate()
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        let mut students = self.students.write();
        let duplicate_oen = students
            .values()
            .any(|other| other.oen == student.oen && other.id != student.id);
        if duplicate_oen {
            return Err(RepositoryError::Conflict(format!(
                "OEN '{}' already registered",
                student.oen
            )));
        }
        if student.id == 0 {
            student.id = self.assign_id();
        }
        students.insert(student.id, student.clone());
        Ok(())
    }

    fn delete_student(&self, id: i64) -> RepoResult<()> {
        if self.students.write().remove(&id).is_none() {
            return Err(RepositoryError::not_found("student", id));
        }
        // Cascade: the student owns its enrollment rows.
        self.enrollments.write().retain(|_, sc| sc.student_id != id);
        Ok(())
    }

    fn get_course(&self, code: &str) -> RepoResult<Course> {
        self.courses
            .read()
            .get(code)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("course", code))
    }

    fn list_courses(&self) -> Vec<Course> {
        let mut courses: Vec<Course> = self.courses.read().values().cloned().collect();
        courses.sort_by(|a, b| a.course_code.cmp(&b.course_code));
        courses
    }

    fn save_course(&self, course: &Course) -> RepoResult<()> {
        course
            .validate()
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        self.courses
            .write()
            .insert(course.course_code.clone(), course.clone());
        Ok(())
    }

    fn delete_course(&self, code: &str) -> RepoResult<()> {
        if self.courses.write().remove(code).is_none() {
            return Err(RepositoryError::not_found("course", code));
        }
        Ok(())
    }

    fn get_enrollment(&self, id: i64) -> RepoResult<StudentCourse> {
        self.enrollments
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("enrollment", id))
    }

    fn list_enrollments(&self, student_id: i64) -> Vec<StudentCourse> {
        let mut rows: Vec<StudentCourse> = self
            .enrollments
            .read()
            .values()
            .filter(|sc| sc.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by_key(|sc| sc.id);
        rows
    }

    fn save_enrollment(&self, enrollment: &mut StudentCourse) -> RepoResult<()> {
        enrollment
            .validate()
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        if !self.students.read().contains_key(&enrollment.student_id) {
            return Err(RepositoryError::not_found("student", enrollment.student_id));
        }
        let mut enrollments = self.enrollments.write();
        let duplicate_pair = enrollments.values().any(|other| {
            other.student_id == enrollment.student_id
                && other.course_code == enrollment.course_code
                && other.id != enrollment.id
        });
        if duplicate_pair {
            return Err(RepositoryError::Conflict(format!(
                "student {} is already enrolled in {}",
                enrollment.student_id, enrollment.course_code
            )));
        }
        if enrollment.id == 0 {
            enrollment.id = self.assign_id();
        }
        enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    fn get_template(&self, template_type: TemplateType) -> RepoResult<Template> {
        self.templates
            .read()
            .iter()
            .find(|t| t.template_type == template_type)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("template", template_type.as_str()))
    }

    fn save_template(&self, template: &mut Template) -> RepoResult<()> {
        let mut templates = self.templates.write();
        if template.id == 0 {
            template.id = self.assign_id();
            templates.push(template.clone());
            return Ok(());
        }
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(slot) => *slot = template.clone(),
            None => templates.push(template.clone()),
        }
        Ok(())
    }

    fn get_job(&self, id: i64) -> RepoResult<DocumentJob> {
        self.jobs
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("document job", id))
    }

    fn save_job(&self, job: &mut DocumentJob) -> RepoResult<()> {
        if job.id == 0 {
            job.id = self.assign_id();
        }
        self.jobs.write().insert(job.id, job.clone());
        Ok(())
    }

    fn append_audit_log(&self, mut entry: OperationLog) -> RepoResult<()> {
        entry.log_id = self.assign_id();
        self.audit_log.write().push(entry);
        Ok(())
    }

    fn list_audit_logs(&self) -> Vec<OperationLog> {
        self.audit_log.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseStatus, GraduationStatus, Month, RecordDate};

    fn student(oen: &str) -> Student {
        Student {
            id: 0,
            oen: oen.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            birth_date: RecordDate::new(2007, Month::Mar, 5),
            enrollment_date: RecordDate::new(2023, Month::Sep, 1),
            expected_graduation: RecordDate::new(2027, Month::Jun, 30),
            address: None,
            graduation_status: GraduationStatus::InProgress,
            grade_level: 11,
            volunteer_hours: 0,
            remark: None,
        }
    }

    #[test]
    fn test_oen_unique_constraint() {
        let repo = MemoryRepository::new();
        let mut first = student("123456789");
        repo.save_student(&mut first).unwrap();

        let mut dup = student("123456789");
        assert!(matches!(
            repo.save_student(&mut dup),
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn test_enrollment_pair_unique_and_cascade() {
        let repo = MemoryRepository::new();
        let mut s = student("123456789");
        repo.save_student(&mut s).unwrap();

        let mut sc = StudentCourse::new(
            0,
            s.id,
            "ENG4U",
            CourseStatus::Registered,
            RecordDate::new(2025, Month::Sep, 5),
        );
        repo.save_enrollment(&mut sc).unwrap();

        let mut dup = StudentCourse::new(
            0,
            s.id,
            "ENG4U",
            CourseStatus::Registered,
            RecordDate::new(2025, Month::Sep, 5),
        );
        assert!(matches!(
            repo.save_enrollment(&mut dup),
            Err(RepositoryError::Conflict(_))
        ));

        repo.delete_student(s.id).unwrap();
        assert!(repo.list_enrollments(s.id).is_empty());
        assert!(repo.get_enrollment(sc.id).is_err());
    }

    #[test]
    fn test_template_first_match_by_type() {
        use crate::models::{Template, TemplateType};
        let repo = MemoryRepository::new();
        let mut a = Template {
            id: 0,
            template_type: TemplateType::WelcomeLetter,
            file_path: "a.docx".to_string(),
            description: None,
        };
        let mut b = Template {
            id: 0,
            template_type: TemplateType::WelcomeLetter,
            file_path: "b.docx".to_string(),
            description: None,
        };
        repo.save_template(&mut a).unwrap();
        repo.save_template(&mut b).unwrap();
        let found = repo.get_template(TemplateType::WelcomeLetter).unwrap();
        assert_eq!(found.file_path, "a.docx");
    }
}
