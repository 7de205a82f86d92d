//! Report-card context assembly.

use chrono::Local;
use serde_json::{json, Value};

use crate::models::{Course, Student, StudentCourse};

use super::context::{semester_for, Context, ContextBuilder, ReportCardOverrides};
use super::skills::{generate_comment, infer_learning_skills, SkillDomain};

impl ContextBuilder {
    /// Context for the report-card form. Each enrollment reports either its
    /// midterm ("1") or final ("2") standing: an explicit per-enrollment
    /// override wins, otherwise the presence of a final grade decides.
    /// Every derived row field can be overridden through
    /// `overrides.fields[enrollment_id]`.
    pub fn report_card_context(
        &self,
        student: &Student,
        enrollments: &[(StudentCourse, Course)],
        overrides: &ReportCardOverrides,
    ) -> Context {
        let mut ctx = self.student_context(student);

        let semester = overrides
            .semester
            .clone()
            .unwrap_or_else(|| semester_for(Local::now()).to_string());

        ctx.insert("semester".to_string(), json!(semester));
        ctx.insert("name".to_string(), json!(student.full_name()));
        ctx.insert("OEN".to_string(), json!(student.oen));
        ctx.insert("Grade".to_string(), json!(student.grade_level.to_string()));
        ctx.insert(
            "homeroom".to_string(),
            json!(overrides.homeroom.clone().unwrap_or_else(|| "N/A".to_string())),
        );
        ctx.insert("principal".to_string(), json!(self.school.principal));
        ctx.insert("schoolName".to_string(), json!(self.school.name));
        ctx.insert("schoolAddr".to_string(), json!(self.school.address));
        ctx.insert("schoolTel".to_string(), json!(self.school.phone));
        ctx.insert("schoolFax".to_string(), json!(self.school.fax));
        ctx.insert("schoolBoard".to_string(), json!(self.school.board));
        ctx.insert("schoolWeb".to_string(), json!(self.school.website));
        ctx.insert("schoolBSID".to_string(), json!(self.school.bsid));

        let mut rows = Vec::with_capacity(enrollments.len());
        for (sc, course) in enrollments {
            rows.push(self.report_card_row(sc, course, overrides));
        }
        ctx.insert("RC_COURSES".to_string(), Value::Array(rows));
        ctx
    }

    fn report_card_row(
        &self,
        sc: &StudentCourse,
        course: &Course,
        overrides: &ReportCardOverrides,
    ) -> Value {
        let reporting_period = overrides
            .reporting_period(sc.id)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if sc.final_grade.is_some() {
                    "2".to_string()
                } else {
                    "1".to_string()
                }
            });

        let mid_score = sc.midterm_grade.unwrap_or(0);
        let final_score = sc.final_grade.unwrap_or(mid_score);

        let mut rng = self.rng.lock();
        let mid_skills = infer_learning_skills(&mut *rng, mid_score);
        let final_skills = infer_learning_skills(&mut *rng, final_score);
        let comment = if reporting_period == "1" {
            generate_comment(&mut *rng, &self.corpus, &mid_skills)
        } else {
            generate_comment(&mut *rng, &self.corpus, &final_skills)
        };
        drop(rng);

        let teacher = self
            .teachers
            .get(&course.course_code)
            .cloned()
            .unwrap_or_else(|| "TBD".to_string());

        let mut row = serde_json::Map::new();
        row.insert("courseTitle".to_string(), json!(course.course_name));
        row.insert("courseCode".to_string(), json!(course.course_code));
        row.insert("teacher".to_string(), json!(teacher));
        row.insert(
            "midmark".to_string(),
            sc.midterm_grade.map(|g| json!(g)).unwrap_or_else(|| json!("")),
        );
        row.insert(
            "finalmark".to_string(),
            sc.final_grade.map(|g| json!(g)).unwrap_or_else(|| json!("")),
        );
        row.insert("midmedian".to_string(), json!(""));
        row.insert("finalmedian".to_string(), json!(""));
        row.insert("midCR".to_string(), json!(""));
        row.insert(
            "finalCR".to_string(),
            json!(format!("{:.2}", course.credit.unwrap_or(0.0))),
        );

        for domain in SkillDomain::ALL {
            let letter = domain.letter();
            row.insert(
                format!("mid{letter}"),
                json!(mid_skills.get(domain).letter().to_string()),
            );
            row.insert(
                format!("final{letter}"),
                json!(final_skills.get(domain).letter().to_string()),
            );
        }

        row.insert("midClassMissed".to_string(), json!(0));
        row.insert("midTotalClass".to_string(), json!(""));
        row.insert("midTimesLate".to_string(), json!(0));
        row.insert("finalClassMissed".to_string(), json!(0));
        row.insert("finalTotalClass".to_string(), json!(""));
        row.insert("finalTimesLate".to_string(), json!(0));
        row.insert("comment".to_string(), json!(comment));

        // Manual values win over everything derived above.
        if let Some(fields) = overrides.fields.get(&sc.id) {
            for (name, value) in fields {
                if name != "reporting" {
                    row.insert(name.clone(), value.clone());
                }
            }
        }

        Value::Object(row)
    }
}
