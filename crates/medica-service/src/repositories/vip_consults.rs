//! VIP consults and assignments repository.

use super::observe;
use crate::errors::MedicaError;
use crate::models::{AssignedConsult, AssignmentStatus, ConsultStatus, NewConsult, VipConsult};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Repository for VIP consultations and their doctor assignments.
pub struct VipConsultsRepository;

impl VipConsultsRepository {
    /// Insert a consult in `pending` status.
    #[instrument(skip_all, fields(specialty = %consult.specialty))]
    pub async fn insert_consult(
        conn: &mut PgConnection,
        patient_id: Uuid,
        consult: &NewConsult,
    ) -> Result<VipConsult, MedicaError> {
        let start = Instant::now();

        let query_result: Result<ConsultRow, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO vip_consults (patient_id, description, specialty, attachment_path, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING consult_id, patient_id, description, specialty, attachment_path,
                      status, created_at
            "#,
        )
        .bind(patient_id)
        .bind(&consult.description)
        .bind(&consult.specialty)
        .bind(consult.attachment_path.as_deref())
        .bind(ConsultStatus::Pending.as_str())
        .fetch_one(conn)
        .await;

        observe("insert_consult", start, query_result)?.try_into()
    }

    /// Insert one `pending` assignment per doctor.
    ///
    /// Returns the number of rows written.
    #[instrument(skip_all, fields(consult_id = %consult_id, count = doctor_ids.len()))]
    pub async fn insert_assignments(
        conn: &mut PgConnection,
        consult_id: Uuid,
        doctor_ids: &[Uuid],
    ) -> Result<u64, MedicaError> {
        if doctor_ids.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            INSERT INTO vip_consult_assignments (consult_id, doctor_id, status)
            SELECT $1, doctor_id, $3
            FROM UNNEST($2::UUID[]) AS doctor_id
            "#,
        )
        .bind(consult_id)
        .bind(doctor_ids)
        .bind(AssignmentStatus::Pending.as_str())
        .execute(conn)
        .await;

        let result = observe("insert_assignments", start, query_result)?;
        Ok(result.rows_affected())
    }

    /// Assignment rows of a consult as doctor IDs.
    #[instrument(skip_all, fields(consult_id = %consult_id))]
    pub async fn list_assigned_doctor_ids(
        pool: &PgPool,
        consult_id: Uuid,
    ) -> Result<Vec<Uuid>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<(Uuid,)>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT doctor_id
            FROM vip_consult_assignments
            WHERE consult_id = $1
            ORDER BY doctor_id
            "#,
        )
        .bind(consult_id)
        .fetch_all(pool)
        .await;

        let rows = observe("list_assigned_doctors", start, query_result)?;
        Ok(rows.into_iter().map(|(doctor_id,)| doctor_id).collect())
    }

    /// Open (pending or accepted) assignments of a doctor, newest first.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn list_open_for_doctor(
        pool: &PgPool,
        doctor_id: Uuid,
    ) -> Result<Vec<AssignedConsult>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<AssignedConsultRow>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT a.assignment_id, a.status AS assignment_status, a.created_at AS assigned_at,
                   c.consult_id, c.patient_id, c.description, c.specialty,
                   c.attachment_path, c.status, c.created_at
            FROM vip_consult_assignments a
            JOIN vip_consults c ON c.consult_id = a.consult_id
            WHERE a.doctor_id = $1 AND a.status IN ('pending', 'accepted')
            ORDER BY a.created_at DESC, a.assignment_id
            "#,
        )
        .bind(doctor_id)
        .fetch_all(pool)
        .await;

        observe("list_doctor_assignments", start, query_result)?
            .into_iter()
            .map(AssignedConsult::try_from)
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct ConsultRow {
    consult_id: Uuid,
    patient_id: Uuid,
    description: String,
    specialty: String,
    attachment_path: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ConsultRow> for VipConsult {
    type Error = MedicaError;

    fn try_from(row: ConsultRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ConsultStatus>().map_err(|e| {
            tracing::error!(target: "medica.repository.vip_consults", error = %e, "Corrupt consult status");
            MedicaError::Internal
        })?;

        Ok(VipConsult {
            consult_id: row.consult_id,
            patient_id: row.patient_id,
            description: row.description,
            specialty: row.specialty,
            attachment_path: row.attachment_path,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignedConsultRow {
    assignment_id: Uuid,
    assignment_status: String,
    assigned_at: DateTime<Utc>,
    #[sqlx(flatten)]
    consult: ConsultRow,
}

impl TryFrom<AssignedConsultRow> for AssignedConsult {
    type Error = MedicaError;

    fn try_from(row: AssignedConsultRow) -> Result<Self, Self::Error> {
        let assignment_status = row.assignment_status.parse::<AssignmentStatus>().map_err(|e| {
            tracing::error!(target: "medica.repository.vip_consults", error = %e, "Corrupt assignment status");
            MedicaError::Internal
        })?;

        Ok(AssignedConsult {
            assignment_id: row.assignment_id,
            assignment_status,
            assigned_at: row.assigned_at,
            consult: row.consult.try_into()?,
        })
    }
}
