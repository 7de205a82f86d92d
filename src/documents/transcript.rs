//! Transcript context assembly, including the equivalent-credit handling.

use chrono::Local;
use serde_json::json;

use crate::models::{Course, Student, StudentCourse};

use super::context::{Context, ContextBuilder, TranscriptOverrides};

/// The OST form carries at most this many course rows.
const MAX_ROWS: usize = 23;

struct TranscriptRow {
    code: String,
    course: String,
    level: String,
    grade: String,
    cr: String,
    compul: String,
    note: String,
    month: String,
    year: String,
}

impl ContextBuilder {
    /// Context for the Ontario Student Transcript form. A PLE enrollment
    /// (externally earned equivalent credit) becomes a synthetic first row
    /// whose credit figures come from the repurposed grade fields; the
    /// remaining rows keep their given order. Totals run over all
    /// enrollments, not just the rows that fit on the form.
    pub fn transcript_context(
        &self,
        student: &Student,
        enrollments: &[(StudentCourse, Course)],
        is_final: bool,
        overrides: &TranscriptOverrides,
    ) -> Context {
        let mut ctx = Context::new();

        ctx.insert(
            "date".to_string(),
            json!(overrides
                .date
                .clone()
                .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())),
        );
        ctx.insert(
            "currPage".to_string(),
            json!(overrides.curr_page.clone().unwrap_or_else(|| "1".to_string())),
        );
        ctx.insert(
            "totalPage".to_string(),
            json!(overrides.total_page.clone().unwrap_or_else(|| "1".to_string())),
        );

        ctx.insert("lastName".to_string(), json!(student.last_name));
        ctx.insert("firstName".to_string(), json!(student.first_name));
        ctx.insert("OEN".to_string(), json!(student.oen));
        ctx.insert("dobYear".to_string(), json!(student.birth_date.year.to_string()));
        ctx.insert(
            "dobMonth".to_string(),
            json!(student.birth_date.month.number().to_string()),
        );
        ctx.insert("dobDay".to_string(), json!(student.birth_date.day.to_string()));
        ctx.insert(
            "enrollYear".to_string(),
            json!(student.enrollment_date.year.to_string()),
        );
        ctx.insert(
            "enrollMonth".to_string(),
            json!(student.enrollment_date.month.number().to_string()),
        );
        ctx.insert(
            "enrollDay".to_string(),
            json!(student.enrollment_date.day.to_string()),
        );
        ctx.insert("studentNo".to_string(), json!(student.student_number()));

        ctx.insert("schoolBoard".to_string(), json!("Private"));
        ctx.insert("boardNumber".to_string(), json!(self.school.board_number));
        ctx.insert("schoolName".to_string(), json!(self.school.name));
        ctx.insert("schoolNo".to_string(), json!(self.school.school_number));

        if is_final {
            ctx.insert(
                "gradYear".to_string(),
                json!(student.expected_graduation.year.to_string()),
            );
        }

        let mut rows: Vec<TranscriptRow> = Vec::new();

        // Equivalent credit comes first as a synthetic row.
        if let Some((ple, _)) = enrollments.iter().find(|(sc, _)| sc.is_ple()) {
            rows.push(TranscriptRow {
                code: "PLE".to_string(),
                course: "Equivalent Credits".to_string(),
                level: String::new(),
                grade: "EQV".to_string(),
                cr: format!("{}", ple.ple_pseudo_credit() as i64),
                compul: ple.ple_pseudo_compulsory_count().to_string(),
                note: String::new(),
                month: ple.start_date.month.number().to_string(),
                year: format!("*{}", ple.start_date.year),
            });
        }

        for (sc, course) in enrollments.iter().filter(|(sc, _)| !sc.is_ple()) {
            rows.push(TranscriptRow {
                code: course.course_code.clone(),
                course: course.course_name.clone(),
                level: course.course_level.transcript_abbrev().to_string(),
                grade: sc
                    .final_grade
                    .map(|g| g.to_string())
                    .unwrap_or_default(),
                cr: format!("{:.1}", effective_credit(sc, course)),
                compul: if sc.is_compulsory { "X" } else { "" }.to_string(),
                note: String::new(),
                month: sc.start_date.month.number().to_string(),
                year: if sc.is_local {
                    sc.start_date.year.to_string()
                } else {
                    format!("*{}", sc.start_date.year)
                },
            });
        }

        for (i, row) in rows.iter().take(MAX_ROWS).enumerate() {
            let n = i + 1;
            ctx.insert(format!("code{n}"), json!(row.code));
            ctx.insert(format!("course{n}"), json!(row.course));
            ctx.insert(format!("level{n}"), json!(row.level));
            ctx.insert(format!("grade{n}"), json!(row.grade));
            ctx.insert(format!("cr{n}"), json!(row.cr));
            ctx.insert(format!("compul{n}"), json!(row.compul));
            ctx.insert(format!("note{n}"), json!(row.note));
            ctx.insert(format!("month{n}"), json!(row.month));
            ctx.insert(format!("year{n}"), json!(row.year));
        }

        let (total_cr, total_compul) = credit_totals(enrollments);
        ctx.insert("totalcr".to_string(), json!(format!("{}", total_cr as i64)));
        ctx.insert("totalcompul".to_string(), json!(total_compul.to_string()));

        ctx
    }
}

/// Credit counted for a regular transcript row: the per-student override
/// when one was granted, otherwise the course master credit.
fn effective_credit(sc: &StudentCourse, course: &Course) -> f64 {
    sc.override_credit().or(course.credit).unwrap_or(0.0)
}

/// Aggregate credit figures over every enrollment. The PLE row contributes
/// its pseudo credit and pseudo compulsory count; every other enrollment
/// contributes its effective credit and one compulsory tick when flagged.
fn credit_totals(enrollments: &[(StudentCourse, Course)]) -> (f64, u32) {
    let mut total_cr = 0.0;
    let mut total_compul = 0u32;
    for (sc, course) in enrollments {
        if sc.is_ple() {
            total_cr += sc.ple_pseudo_credit();
            total_compul += sc.ple_pseudo_compulsory_count();
        } else {
            total_cr += effective_credit(sc, course);
            if sc.is_compulsory {
                total_compul += 1;
            }
        }
    }
    (total_cr, total_compul)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchoolInfo;
    use crate::models::{
        CourseLevel, CourseStatus, GraduationStatus, Month, RecordDate, PLE_COURSE_CODE,
    };

    fn student() -> Student {
        Student {
            id: 12,
            oen: "123456789".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            birth_date: RecordDate::new(2007, Month::Mar, 5),
            enrollment_date: RecordDate::new(2023, Month::Sep, 1),
            expected_graduation: RecordDate::new(2027, Month::Jun, 30),
            address: None,
            graduation_status: GraduationStatus::InProgress,
            grade_level: 12,
            volunteer_hours: 40,
            remark: None,
        }
    }

    fn eng4u() -> Course {
        Course {
            course_code: "ENG4U".to_string(),
            course_name: "English".to_string(),
            description: String::new(),
            credit: Some(1.0),
            course_level: CourseLevel::Grade12,
            is_compulsory: true,
        }
    }

    fn ple_course() -> Course {
        Course {
            course_code: PLE_COURSE_CODE.to_string(),
            course_name: "Equivalent Credits".to_string(),
            description: String::new(),
            credit: None,
            course_level: CourseLevel::Eqv,
            is_compulsory: false,
        }
    }

    fn completed(id: i64, code: &str, fin: Option<u8>) -> StudentCourse {
        let mut sc = StudentCourse::new(
            id,
            12,
            code,
            CourseStatus::Completed,
            RecordDate::new(2024, Month::Sep, 5),
        );
        sc.set_midterm_grade(fin.unwrap_or(80)).unwrap();
        if let Some(g) = fin {
            sc.set_final_grade(g).unwrap();
        }
        sc.is_compulsory = true;
        sc
    }

    fn builder() -> ContextBuilder {
        ContextBuilder::with_seed(SchoolInfo::default(), 3)
    }

    #[test]
    fn test_ple_row_first_with_pseudo_figures() {
        let mut ple = StudentCourse::new(
            1,
            12,
            PLE_COURSE_CODE,
            CourseStatus::Completed,
            RecordDate::new(2023, Month::Sep, 1),
        );
        ple.set_midterm_grade(20).unwrap();
        ple.set_final_grade(4).unwrap();
        ple.is_local = false;

        let rows = vec![
            (completed(2, "ENG4U", Some(88)), eng4u()),
            (ple, ple_course()),
        ];
        let ctx =
            builder().transcript_context(&student(), &rows, false, &TranscriptOverrides::default());

        assert_eq!(ctx["code1"], json!("PLE"));
        assert_eq!(ctx["course1"], json!("Equivalent Credits"));
        assert_eq!(ctx["grade1"], json!("EQV"));
        assert_eq!(ctx["cr1"], json!("20"));
        assert_eq!(ctx["compul1"], json!("4"));
        assert_eq!(ctx["year1"], json!("*2023"));

        assert_eq!(ctx["code2"], json!("ENG4U"));
        assert_eq!(ctx["grade2"], json!("88"));
        assert_eq!(ctx["cr2"], json!("1.0"));
        assert_eq!(ctx["compul2"], json!("X"));

        // Totals run over all enrollments: 20 equivalent + 1.0 earned,
        // 4 compulsory equivalents + 1 compulsory course.
        assert_eq!(ctx["totalcr"], json!("21"));
        assert_eq!(ctx["totalcompul"], json!("5"));
    }

    #[test]
    fn test_non_local_year_starred() {
        let mut sc = completed(2, "ENG4U", Some(75));
        sc.is_local = false;
        let rows = vec![(sc, eng4u())];
        let ctx =
            builder().transcript_context(&student(), &rows, false, &TranscriptOverrides::default());
        assert_eq!(ctx["year1"], json!("*2024"));
    }

    #[test]
    fn test_override_credit_used_in_row_and_totals() {
        let mut sc = completed(2, "ENG4U", Some(75));
        sc.set_override_credit(2.5).unwrap();
        let rows = vec![(sc, eng4u())];
        let ctx =
            builder().transcript_context(&student(), &rows, false, &TranscriptOverrides::default());
        assert_eq!(ctx["cr1"], json!("2.5"));
        assert_eq!(ctx["totalcr"], json!("2"));
    }

    #[test]
    fn test_esl_level_abbreviation() {
        let mut course = eng4u();
        course.course_code = "ESLCO".to_string();
        course.course_level = CourseLevel::Esl3;
        let rows = vec![(completed(2, "ESLCO", None), course)];
        let ctx =
            builder().transcript_context(&student(), &rows, false, &TranscriptOverrides::default());
        assert_eq!(ctx["level1"], json!("3"));
        assert_eq!(ctx["grade1"], json!(""));
    }

    #[test]
    fn test_row_cap_and_totals_beyond_cap() {
        let mut rows = Vec::new();
        for i in 0..30 {
            let mut course = eng4u();
            course.course_code = format!("C{i:02}4U");
            let mut sc = completed(i + 10, &course.course_code, Some(70));
            sc.is_compulsory = false;
            rows.push((sc, course));
        }
        let ctx =
            builder().transcript_context(&student(), &rows, false, &TranscriptOverrides::default());
        assert!(ctx.contains_key("code23"));
        assert!(!ctx.contains_key("code24"));
        // All 30 courses count toward the total even though only 23 render.
        assert_eq!(ctx["totalcr"], json!("30"));
    }

    #[test]
    fn test_final_transcript_has_grad_year() {
        let ctx =
            builder().transcript_context(&student(), &[], true, &TranscriptOverrides::default());
        assert_eq!(ctx["gradYear"], json!("2027"));
        assert_eq!(ctx["studentNo"], json!("230912070305"));
    }
}
