//! Complaint creation and triage operations.

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{info, warn};

use vigil_shared::attachment::{Attachment, AttachmentError, FileUpload};
use vigil_shared::constants::MAX_DOCUMENT_BYTES;
use vigil_shared::types::{ComplaintId, Coordinates, Status, VehicleType};
use vigil_store::{Complaint, Complaints, StoreError};

use crate::notify::{self, ConfirmationEmail, NotifyError};
use crate::state::AppState;

/// Submitter-provided input for a new complaint.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub vehicle_no: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub vehicle_image: Option<FileUpload>,
    pub rc_document: Option<FileUpload>,
    pub date: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ComplaintError {
    /// Theft date is after submission time.
    #[error("Theft date cannot be in the future")]
    DateInFuture,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The store rejected the operation. On the creation path this is
    /// fatal: the complaint is not created.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Could not find a free identifier.
    #[error("Could not allocate a complaint id")]
    IdExhausted,
}

/// A successful submission: the committed record plus the advisory channel
/// carrying the confirmation-email outcome. The email is never part of the
/// critical path; dropping the receiver is fine.
#[derive(Debug)]
pub struct Submission {
    pub complaint: Complaint,
    pub email_outcome: oneshot::Receiver<Result<(), NotifyError>>,
}

const ID_ATTEMPTS: usize = 4;

/// Create a complaint: validate, encode both documents, allocate an id,
/// write the fully populated record, then fire the confirmation email in
/// the background.
pub async fn create(state: &AppState, input: NewComplaint) -> Result<Submission, ComplaintError> {
    let now = Utc::now();
    if input.date > now {
        return Err(ComplaintError::DateInFuture);
    }

    let vehicle_image = input
        .vehicle_image
        .as_ref()
        .map(|file| Attachment::encode(file, MAX_DOCUMENT_BYTES))
        .transpose()?;
    let rc_document = input
        .rc_document
        .as_ref()
        .map(|file| Attachment::encode(file, MAX_DOCUMENT_BYTES))
        .transpose()?;

    let complaints = state.store.complaints();
    let id = allocate_id(&complaints).await?;

    let complaint = Complaint {
        id: id.clone(),
        owner_name: input.owner_name,
        contact_info: format!("{} | {}", input.email, input.phone),
        email: input.email,
        phone: input.phone,
        vehicle_type: input.vehicle_type,
        vehicle_no: input.vehicle_no,
        location: input.location,
        coordinates: input.coordinates,
        vehicle_image,
        rc_document,
        date: input.date,
        description: input.description,
        status: Status::Pending,
        messages: Vec::new(),
        timestamp: now,
    };

    complaints.create(&complaint).await?;
    info!(id = %complaint.id, vehicle_no = %complaint.vehicle_no, "complaint created");

    // Confirmation email only after the write commits; its failure is
    // advisory and never rolls the record back.
    let email_outcome = notify::spawn_confirmation(
        state.notifier.clone(),
        ConfirmationEmail {
            to_name: complaint.owner_name.clone(),
            to_email: complaint.email.clone(),
            complaint_id: complaint.id.clone(),
            vehicle_no: complaint.vehicle_no.clone(),
            status_link: state.config.status_link.clone(),
        },
    );

    Ok(Submission {
        complaint,
        email_outcome,
    })
}

/// Generated ids carry no uniqueness guarantee, so check the store before
/// writing: a collision must not silently overwrite an existing record.
async fn allocate_id(complaints: &Complaints) -> Result<ComplaintId, ComplaintError> {
    for _ in 0..ID_ATTEMPTS {
        let id = ComplaintId::generate();
        if !complaints.exists(&id).await? {
            return Ok(id);
        }
        warn!(id = %id, "complaint id collision, regenerating");
    }
    Err(ComplaintError::IdExhausted)
}

/// Fetch a single complaint by id.
pub async fn get(state: &AppState, id: &ComplaintId) -> Result<Option<Complaint>, ComplaintError> {
    Ok(state.store.complaints().get(id).await?)
}

/// All complaints, newest first.
pub async fn list(state: &AppState) -> Result<Vec<Complaint>, ComplaintError> {
    Ok(state.store.complaints().list().await?)
}

/// Overwrite the status. Any status may be set from any other; concurrent
/// writers race and the last committed write wins.
pub async fn update_status(
    state: &AppState,
    id: &ComplaintId,
    status: Status,
) -> Result<(), ComplaintError> {
    match state.store.complaints().set_status(id, status).await {
        Ok(()) => {
            info!(id = %id, status = %status, "status updated");
            Ok(())
        }
        Err(e) => {
            // Secondary path: nothing visibly happens and the user retries
            // by interacting again.
            warn!(id = %id, error = %e, "status update failed");
            Err(ComplaintError::Persistence(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use vigil_store::DocumentStore;

    fn test_state() -> AppState {
        AppState::new(DocumentStore::new(), AppConfig::default())
    }

    fn sample_input() -> NewComplaint {
        NewComplaint {
            owner_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            vehicle_type: VehicleType::Car,
            vehicle_no: "MH12AB1234".to_string(),
            location: "18.520430, 73.856743".to_string(),
            coordinates: Some(Coordinates {
                lat: 18.520_430,
                lng: 73.856_743,
            }),
            vehicle_image: Some(FileUpload::new(
                "vehicle.jpg",
                "image/jpeg",
                vec![0xFF; 2048],
            )),
            rc_document: Some(FileUpload::new("rc.pdf", "application/pdf", vec![0x25; 512])),
            date: Utc::now() - chrono::Duration::days(1),
            description: "Parked overnight outside the society gate".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_read_matches_input() {
        let state = test_state();
        let submission = create(&state, sample_input()).await.unwrap();
        let complaint = &submission.complaint;

        assert_eq!(complaint.status, Status::Pending);
        assert!(complaint.messages.is_empty());
        assert_eq!(complaint.contact_info, "asha@example.com | 9876543210");
        assert!(complaint.vehicle_image.as_ref().unwrap().is_image());

        let read = get(&state, &complaint.id).await.unwrap().unwrap();
        assert_eq!(&read, complaint);
    }

    #[tokio::test]
    async fn future_theft_date_is_rejected() {
        let state = test_state();
        let mut input = sample_input();
        input.date = Utc::now() + chrono::Duration::hours(1);

        let err = create(&state, input).await.unwrap_err();
        assert!(matches!(err, ComplaintError::DateInFuture));
    }

    #[tokio::test]
    async fn oversized_document_is_rejected_before_any_write() {
        let state = test_state();
        let mut input = sample_input();
        input.vehicle_image = Some(FileUpload::new(
            "huge.png",
            "image/png",
            vec![0u8; MAX_DOCUMENT_BYTES + 1],
        ));

        let err = create(&state, input).await.unwrap_err();
        assert!(matches!(
            err,
            ComplaintError::Attachment(AttachmentError::TooLarge { .. })
        ));
        assert!(list(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn document_at_exact_limit_is_accepted() {
        let state = test_state();
        let mut input = sample_input();
        input.rc_document = Some(FileUpload::new(
            "rc.png",
            "image/png",
            vec![0u8; MAX_DOCUMENT_BYTES],
        ));

        assert!(create(&state, input).await.is_ok());
    }

    #[tokio::test]
    async fn email_outcome_arrives_without_blocking_creation() {
        let state = test_state();
        let submission = create(&state, sample_input()).await.unwrap();

        // Default config has no email service; the advisory channel still
        // reports, and the complaint stays committed.
        let outcome = submission.email_outcome.await.unwrap();
        assert!(outcome.is_err());
        assert!(get(&state, &submission.complaint.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn update_status_reflects_on_read() {
        let state = test_state();
        let submission = create(&state, sample_input()).await.unwrap();
        let id = submission.complaint.id.clone();

        update_status(&state, &id, Status::Found).await.unwrap();
        let read = get(&state, &id).await.unwrap().unwrap();
        assert_eq!(read.status, Status::Found);

        // Backwards is allowed too.
        update_status(&state, &id, Status::Investigating)
            .await
            .unwrap();
        let read = get(&state, &id).await.unwrap().unwrap();
        assert_eq!(read.status, Status::Investigating);
    }

    #[tokio::test]
    async fn update_status_on_missing_record_fails() {
        let state = test_state();
        let id: ComplaintId = "CR-ZZZ999".parse().unwrap();
        let err = update_status(&state, &id, Status::Closed).await.unwrap_err();
        assert!(matches!(err, ComplaintError::Persistence(_)));
    }
}
