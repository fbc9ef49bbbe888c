use mime::Mime;

use super::domain::{
    GeoPoint, MediaAttachment, MediaKind, MediaUpload, PropertyId, UserId, ViolationReport,
};

/// Validation errors raised while admitting citizen and owner input.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("violation type is required")]
    MissingViolationType,
    #[error("valid location coordinates are required (got {latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("objection reason is required")]
    EmptyObjectionReason,
    #[error("override reason is required")]
    EmptyOverrideReason,
}

/// Sanitized report after intake validation, ready for decisioning.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedReport {
    pub reported_by: UserId,
    pub violation_type: String,
    pub description: String,
    pub location: GeoPoint,
    pub related_property: Option<PropertyId>,
    pub entity_type: Option<String>,
    pub media: Vec<MediaAttachment>,
}

/// Guard admitting citizen reports into the workflow.
#[derive(Debug, Default, Clone)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Validate a report and classify its evidence attachments.
    pub fn admit(&self, report: ViolationReport) -> Result<AdmittedReport, ValidationError> {
        let violation_type = report.violation_type.trim();
        if violation_type.is_empty() {
            return Err(ValidationError::MissingViolationType);
        }

        let location = GeoPoint {
            latitude: report.latitude,
            longitude: report.longitude,
        };
        if !location.in_bounds() {
            return Err(ValidationError::InvalidCoordinates {
                latitude: report.latitude,
                longitude: report.longitude,
            });
        }

        let media = report.media.iter().map(classify).collect();

        Ok(AdmittedReport {
            reported_by: report.reported_by,
            violation_type: violation_type.to_string(),
            description: report.description.trim().to_string(),
            location,
            related_property: report.related_property,
            entity_type: report
                .entity_type
                .map(|hint| hint.trim().to_string())
                .filter(|hint| !hint.is_empty()),
            media,
        })
    }
}

/// Anything that is not an image is stored as video, mirroring the upload
/// layer's two-bucket split.
fn classify(upload: &MediaUpload) -> MediaAttachment {
    let kind = upload
        .content_type
        .parse::<Mime>()
        .ok()
        .filter(|mime| mime.type_() == mime::IMAGE)
        .map(|_| MediaKind::Image)
        .unwrap_or(MediaKind::Video);

    MediaAttachment {
        url: upload.url.clone(),
        kind,
    }
}

pub(crate) fn require_objection_reason(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyObjectionReason);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_override_reason(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyOverrideReason);
    }
    Ok(trimmed.to_string())
}
