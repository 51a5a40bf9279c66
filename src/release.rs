//! [`ReleaseRequest`] form data and its per-request [`ValidationContext`].

use std::num::NonZeroU16;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Model, Tone};

/// Maximum number of keywords an [`Announcement`] may carry.
pub const MAX_KEYWORDS: usize = 3;

static PHONE: Lazy<Regex> = Lazy::new(|| {
    // Literal pattern, can't fail.
    Regex::new(r"^[0-9-]+$").unwrap()
});

/// A form field, in display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
pub enum Field {
    #[allow(missing_docs)]
    #[display("보도자료 제목")]
    Title,
    #[allow(missing_docs)]
    #[display("보도자료 주제")]
    Topic,
    #[allow(missing_docs)]
    #[display("핵심 키워드")]
    Keywords,
    #[allow(missing_docs)]
    #[display("담당 부서")]
    Department,
    #[allow(missing_docs)]
    #[display("담당자")]
    ContactPerson,
    #[allow(missing_docs)]
    #[display("연락처")]
    Phone,
    #[allow(missing_docs)]
    #[display("이메일")]
    Email,
    #[allow(missing_docs)]
    #[display("보도자료 핵심반영")]
    CoreMessage,
}

/// Why a [`Field`] was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A required field is empty or whitespace.
    #[error("{0} 입력 필요")]
    Required(Field),
    /// The phone number has characters other than digits and `-`.
    #[error("전화번호를 정확히 입력해주세요. (숫자와 '-'만 허용)")]
    Phone,
    /// More keywords than [`MAX_KEYWORDS`].
    #[error("핵심 키워드는 최대 {max}개까지 입력할 수 있습니다. ({actual}개 입력)")]
    TooManyKeywords {
        #[allow(missing_docs)]
        max: usize,
        #[allow(missing_docs)]
        actual: usize,
    },
}

impl FieldError {
    /// The field this error belongs to.
    pub fn field(&self) -> Field {
        match self {
            Self::Required(field) => *field,
            Self::Phone => Field::Phone,
            Self::TooManyKeywords { .. } => Field::Keywords,
        }
    }
}

/// Check a phone number. Empty passes here; use the required check for that.
pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    if phone.is_empty() || PHONE.is_match(phone) {
        Ok(())
    } else {
        Err(FieldError::Phone)
    }
}

/// Errors found while validating one submission. Create one per request, pass
/// it through [`ReleaseRequest::validate`], and read the result.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    errors: Vec<FieldError>,
}

impl ValidationContext {
    /// Fresh context without errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// True if nothing was recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// All recorded errors, in field order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The first error for `field`, if any.
    pub fn error_for(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    fn require(&mut self, field: Field, value: &str) {
        if value.trim().is_empty() {
            self.push(FieldError::Required(field));
        }
    }

    fn phone(&mut self, phone: &str) {
        if phone.trim().is_empty() {
            self.push(FieldError::Required(Field::Phone));
        } else if let Err(e) = validate_phone(phone) {
            self.push(e);
        }
    }
}

/// Briefing form: title, contact, phone and the core message to reflect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    /// Headline of the release.
    pub title: String,
    /// Person in charge.
    pub contact_person: String,
    /// Contact phone number, digits and hyphens.
    pub phone: String,
    /// What the release must convey.
    pub core_message: String,
}

/// Announcement form: topic, keywords and fuller contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// What the release is about.
    pub topic: String,
    /// Up to [`MAX_KEYWORDS`] key phrases.
    pub keywords: Vec<String>,
    /// Responsible department.
    #[serde(default)]
    pub department: Option<String>,
    /// Person in charge.
    pub contact_person: String,
    /// Contact phone number, digits and hyphens.
    pub phone: String,
    /// Contact e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// When the announced measure applies.
    #[serde(default)]
    pub apply_date: Option<NaiveDate>,
}

impl Announcement {
    /// Keywords that aren't blank, in order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }
}

/// A press-release request, one variant per form.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case", tag = "form")]
pub enum ReleaseRequest {
    /// See [`Briefing`].
    Briefing(Briefing),
    /// See [`Announcement`].
    Announcement(Announcement),
}

impl ReleaseRequest {
    /// Validate every field, recording errors in `ctx`, and hand `ctx` back.
    pub fn validate(&self, mut ctx: ValidationContext) -> ValidationContext {
        match self {
            Self::Briefing(b) => {
                ctx.require(Field::Title, &b.title);
                ctx.require(Field::ContactPerson, &b.contact_person);
                ctx.phone(&b.phone);
                ctx.require(Field::CoreMessage, &b.core_message);
            }
            Self::Announcement(a) => {
                ctx.require(Field::Topic, &a.topic);
                let actual = a.keywords().count();
                if actual > MAX_KEYWORDS {
                    ctx.push(FieldError::TooManyKeywords {
                        max: MAX_KEYWORDS,
                        actual,
                    });
                }
                ctx.require(Field::ContactPerson, &a.contact_person);
                ctx.phone(&a.phone);
            }
        }

        ctx
    }

    /// Model the form was tuned for.
    pub fn model(&self) -> Model {
        match self {
            Self::Briefing(_) => Model::Gpt4,
            Self::Announcement(_) => Model::Gpt4oMini,
        }
    }

    /// Token budget for the reply.
    pub fn max_tokens(&self) -> NonZeroU16 {
        match self {
            Self::Briefing(_) => NonZeroU16::MIN.saturating_add(3999),
            Self::Announcement(_) => NonZeroU16::MIN.saturating_add(999),
        }
    }

    /// Default [`Tone`] for the form.
    pub fn default_tone(&self) -> Tone {
        match self {
            Self::Briefing(_) => Tone::Detailed,
            Self::Announcement(_) => Tone::Balanced,
        }
    }

    /// System instruction sent ahead of the prompt.
    pub fn system_instruction(&self) -> &'static str {
        match self {
            Self::Briefing(_) => {
                "당신은 뛰어난 보도자료 작성가입니다. 서식을 준수하나, 출력폼에 맞추어 자동 줄바꿈 해주세요."
            }
            Self::Announcement(_) => "당신은 뛰어난 보도자료 작성가입니다.",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn briefing() -> Briefing {
        Briefing {
            title: "세종시, 생활폐기물 불법배출 강력 단속".into(),
            contact_person: "정보통계담당관 이세종 주무관".into(),
            phone: "044-300-0000".into(),
            core_message: "3월 17일~28일 자동크린넷 상습 막힘지역 집중 단속".into(),
        }
    }

    pub fn announcement() -> Announcement {
        Announcement {
            topic: "세종시 공유 모빌리티 AI 불편접수시스템 도입 추진".into(),
            keywords: vec!["혁신적인 기술".into(), "RPA활용".into(), "시민편의".into()],
            department: Some("정보통계담당관".into()),
            contact_person: "이세종".into(),
            phone: "044-300-0000".into(),
            email: Some("sejong@korea.kr".into()),
            apply_date: NaiveDate::from_ymd_opt(2025, 3, 17),
        }
    }

    #[test]
    fn test_phone_pattern() {
        for ok in ["", "044-300-0000", "0443000000", "-", "1-2-3"] {
            assert_eq!(validate_phone(ok), Ok(()), "{ok:?}");
        }
        for bad in ["044 300 0000", "+82-44", "044-300-000O", "(044)", "０４４", "044-300-0000\n"] {
            assert_eq!(validate_phone(bad), Err(FieldError::Phone), "{bad:?}");
        }
        assert_eq!(
            FieldError::Phone.to_string(),
            "전화번호를 정확히 입력해주세요. (숫자와 '-'만 허용)"
        );
    }

    #[test]
    fn test_valid_briefing() {
        let request = ReleaseRequest::from(briefing());
        assert!(request.validate(ValidationContext::new()).is_ok());
    }

    #[test]
    fn test_briefing_required_fields() {
        let request = ReleaseRequest::from(Briefing {
            title: "  ".into(),
            phone: "".into(),
            ..briefing()
        });

        let ctx = request.validate(ValidationContext::new());
        assert_eq!(
            ctx.errors(),
            &[
                FieldError::Required(Field::Title),
                FieldError::Required(Field::Phone),
            ]
        );
        assert_eq!(ctx.errors()[0].to_string(), "보도자료 제목 입력 필요");
        assert_eq!(ctx.errors()[1].to_string(), "연락처 입력 필요");
    }

    #[test]
    fn test_bad_phone_reported_on_field() {
        let request = ReleaseRequest::from(Briefing {
            phone: "044.300.0000".into(),
            ..briefing()
        });

        let ctx = request.validate(ValidationContext::new());
        assert_eq!(ctx.error_for(Field::Phone), Some(&FieldError::Phone));
        assert!(ctx.error_for(Field::Title).is_none());
    }

    #[test]
    fn test_announcement_keywords() {
        let mut a = announcement();
        a.keywords.push("".into());
        // Blank keywords don't count.
        assert!(ReleaseRequest::from(a.clone())
            .validate(ValidationContext::new())
            .is_ok());

        a.keywords.push("네번째".into());
        let ctx = ReleaseRequest::from(a).validate(ValidationContext::new());
        assert_eq!(
            ctx.errors(),
            &[FieldError::TooManyKeywords { max: 3, actual: 4 }]
        );
    }

    #[test]
    fn test_announcement_optional_fields() {
        let request = ReleaseRequest::from(Announcement {
            department: None,
            email: None,
            apply_date: None,
            keywords: vec![],
            ..announcement()
        });
        assert!(request.validate(ValidationContext::new()).is_ok());
    }

    #[test]
    fn test_presets() {
        let b = ReleaseRequest::from(briefing());
        assert_eq!(b.model(), Model::Gpt4);
        assert_eq!(b.max_tokens().get(), 4000);
        assert_eq!(b.default_tone(), Tone::Detailed);

        let a = ReleaseRequest::from(announcement());
        assert_eq!(a.model(), Model::Gpt4oMini);
        assert_eq!(a.max_tokens().get(), 1000);
        assert_eq!(a.default_tone(), Tone::Balanced);
        assert_eq!(a.system_instruction(), "당신은 뛰어난 보도자료 작성가입니다.");
    }
}
