//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with exactly six fractional
//! digits. UUIDs are stored as hyphenated lowercase strings. Removal reasons
//! use their snake_case names.

use chrono::{DateTime, SecondsFormat, Utc};
use stride_core::{
  assignment::WearableAssignment,
  footstep::{Footstep, Position},
  profile::{FallRiskProfile, Note, Removal, RemovalReason},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> { s.map(decode_uuid).transpose() }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> { s.map(decode_dt).transpose() }

// ─── RemovalReason ───────────────────────────────────────────────────────────

pub fn encode_reason(reason: RemovalReason) -> String { reason.to_string() }

pub fn decode_reason(s: &str) -> Result<RemovalReason> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown removal reason: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `footsteps` row.
pub struct RawFootstep {
  pub wearable_id: String,
  pub floor_id:    Option<String>,
  pub time:        String,
  pub x:           Option<f64>,
  pub y:           Option<f64>,
}

impl RawFootstep {
  pub fn into_footstep(self) -> Result<Footstep> {
    let position = match (self.x, self.y) {
      (Some(x), Some(y)) => Some(Position::new(x, y)),
      _ => None,
    };
    Ok(Footstep {
      wearable_id: self.wearable_id,
      floor_id: decode_opt_uuid(self.floor_id.as_deref())?,
      time: decode_dt(&self.time)?,
      position,
    })
  }
}

/// Raw values read directly from a `wearable_assignments` row.
pub struct RawAssignment {
  pub assignment_id: String,
  pub user_id:       String,
  pub wearable_id:   String,
  pub begin_time:    String,
  pub end_time:      Option<String>,
}

impl RawAssignment {
  pub fn into_assignment(self) -> Result<WearableAssignment> {
    Ok(WearableAssignment {
      assignment_id: decode_uuid(&self.assignment_id)?,
      user_id:       decode_uuid(&self.user_id)?,
      wearable_id:   self.wearable_id,
      begin_time:    decode_dt(&self.begin_time)?,
      end_time:      decode_opt_dt(self.end_time.as_deref())?,
    })
  }
}

/// Raw values read from a `fall_risk_profile_notes` row.
pub struct RawNote {
  pub value:      String,
  pub created_at: String,
  pub updated_at: Option<String>,
  pub created_by: String,
}

impl RawNote {
  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      value:      self.value,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_opt_dt(self.updated_at.as_deref())?,
      created_by: decode_uuid(&self.created_by)?,
    })
  }
}

/// Raw values read from a `fall_risk_profile_removals` row.
pub struct RawRemoval {
  pub reason:              String,
  pub specification_other: Option<String>,
  pub removed_by:          String,
  pub removed_at:          String,
}

impl RawRemoval {
  pub fn into_removal(self) -> Result<Removal> {
    Ok(Removal {
      reason:              decode_reason(&self.reason)?,
      specification_other: self.specification_other,
      removed_by:          decode_uuid(&self.removed_by)?,
      removed_at:          decode_dt(&self.removed_at)?,
    })
  }
}

/// Columns selected for [`RawProfile::from_row`], with `p` aliasing
/// `fall_risk_profiles` and `r` the left-joined removals.
pub const PROFILE_COLUMNS: &str = "
  p.profile_id, p.wearable_id, p.floor_id, p.creation_time,
  p.begin_time, p.end_time, p.walking_speed, p.step_length,
  p.step_frequency, p.rms_vertical_acceleration, p.hidden,
  r.reason, r.specification_other, r.removed_by, r.removed_at";

/// Raw values read from a `fall_risk_profiles` row joined with its removal.
pub struct RawProfile {
  pub profile_id:                String,
  pub wearable_id:               String,
  pub floor_id:                  Option<String>,
  pub creation_time:             String,
  pub begin_time:                String,
  pub end_time:                  String,
  pub walking_speed:             f64,
  pub step_length:               f64,
  pub step_frequency:            f64,
  pub rms_vertical_acceleration: Option<f64>,
  pub hidden:                    bool,
  // removals join
  pub removal_reason:            Option<String>,
  pub specification_other:       Option<String>,
  pub removed_by:                Option<String>,
  pub removed_at:                Option<String>,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:                row.get(0)?,
      wearable_id:               row.get(1)?,
      floor_id:                  row.get(2)?,
      creation_time:             row.get(3)?,
      begin_time:                row.get(4)?,
      end_time:                  row.get(5)?,
      walking_speed:             row.get(6)?,
      step_length:               row.get(7)?,
      step_frequency:            row.get(8)?,
      rms_vertical_acceleration: row.get(9)?,
      hidden:                    row.get(10)?,
      removal_reason:            row.get(11)?,
      specification_other:       row.get(12)?,
      removed_by:                row.get(13)?,
      removed_at:                row.get(14)?,
    })
  }

  /// The note is left empty; it lives in its own table.
  pub fn into_profile(self) -> Result<FallRiskProfile> {
    let removal = match (self.removal_reason, self.removed_by, self.removed_at) {
      (Some(reason), Some(removed_by), Some(removed_at)) => Some(
        RawRemoval {
          reason,
          specification_other: self.specification_other,
          removed_by,
          removed_at,
        }
        .into_removal()?,
      ),
      _ => None,
    };

    Ok(FallRiskProfile {
      profile_id: decode_uuid(&self.profile_id)?,
      wearable_id: self.wearable_id,
      floor_id: decode_opt_uuid(self.floor_id.as_deref())?,
      creation_time: decode_dt(&self.creation_time)?,
      begin_time: decode_dt(&self.begin_time)?,
      end_time: decode_dt(&self.end_time)?,
      walking_speed: self.walking_speed,
      step_length: self.step_length,
      step_frequency: self.step_frequency,
      rms_vertical_acceleration: self.rms_vertical_acceleration,
      hidden: self.hidden,
      note: None,
      removal,
    })
  }
}
