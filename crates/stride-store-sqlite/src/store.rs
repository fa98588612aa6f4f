//! [`SqliteStore`], the SQLite implementation of [`GaitSource`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stride_core::{
  TimeWindow,
  assignment::WearableAssignment,
  footstep::Footstep,
  profile::{FallRiskProfile, NewFallRiskProfile, Note, Removal, RemovalReason},
  source::GaitSource,
};

use crate::{
  Error, Result,
  encode::{
    PROFILE_COLUMNS, RawAssignment, RawFootstep, RawNote, RawProfile, encode_dt, encode_reason,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Gait measurements and fall risk profiles backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Query profiles of one wearable with `condition` over `p`, excluding
  /// removed ones. `?1` is the wearable, `?2`/`?3` the window bounds.
  async fn query_profiles(
    &self,
    wearable_id: &str,
    window: TimeWindow,
    include_hidden: bool,
    condition: &'static str,
    order_by: &'static str,
  ) -> Result<Vec<FallRiskProfile>> {
    if window.is_inverted() {
      return Ok(Vec::new());
    }
    let wearable_id = wearable_id.to_owned();
    let begin_str = encode_dt(window.begin);
    let end_str = encode_dt(window.end);

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PROFILE_COLUMNS}
           FROM fall_risk_profiles p
           LEFT JOIN fall_risk_profile_removals r ON r.profile_id = p.profile_id
           WHERE p.wearable_id = ?1
             AND {condition}
             AND (?4 OR p.hidden = 0)
             AND r.profile_id IS NULL
           ORDER BY {order_by}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![wearable_id, begin_str, end_str, include_hidden],
            RawProfile::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Append footsteps in a single transaction.
  pub async fn record_footsteps(&self, footsteps: Vec<Footstep>) -> Result<()> {
    let count = footsteps.len();
    let rows: Vec<_> = footsteps
      .into_iter()
      .map(|f| {
        (
          f.wearable_id,
          f.floor_id.map(encode_uuid),
          encode_dt(f.time),
          f.position.map(|p| p.x),
          f.position.map(|p| p.y),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO footsteps (wearable_id, floor_id, time, x, y) VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (wearable_id, floor_id, time, x, y) in rows {
            stmt.execute(rusqlite::params![wearable_id, floor_id, time, x, y])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(count, "recorded footsteps");
    Ok(())
  }

  /// Link `wearable_id` to `user_id` from `begin_time` on.
  pub async fn record_assignment(
    &self,
    user_id: Uuid,
    wearable_id: &str,
    begin_time: DateTime<Utc>,
  ) -> Result<WearableAssignment> {
    let assignment = WearableAssignment {
      assignment_id: Uuid::new_v4(),
      user_id,
      wearable_id: wearable_id.to_owned(),
      begin_time,
      end_time: None,
    };

    let id_str = encode_uuid(assignment.assignment_id);
    let user_str = encode_uuid(user_id);
    let wearable = assignment.wearable_id.clone();
    let begin_str = encode_dt(begin_time);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO wearable_assignments (assignment_id, user_id, wearable_id, begin_time)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, user_str, wearable, begin_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(assignment)
  }

  /// Unlink a wearable by closing its open assignment at `end_time`.
  pub async fn close_assignment(&self, assignment_id: Uuid, end_time: DateTime<Utc>) -> Result<()> {
    let id_str = encode_uuid(assignment_id);

    let current: Option<RawAssignment> = self
      .conn
      .call({
        let id_str = id_str.clone();
        move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT assignment_id, user_id, wearable_id, begin_time, end_time
                 FROM wearable_assignments WHERE assignment_id = ?1",
                rusqlite::params![id_str],
                |row| {
                  Ok(RawAssignment {
                    assignment_id: row.get(0)?,
                    user_id:       row.get(1)?,
                    wearable_id:   row.get(2)?,
                    begin_time:    row.get(3)?,
                    end_time:      row.get(4)?,
                  })
                },
              )
              .optional()?,
          )
        }
      })
      .await?;

    let current = match current {
      Some(raw) => raw.into_assignment()?,
      None => return Err(Error::AssignmentNotFound(assignment_id)),
    };
    if !current.is_active() {
      return Err(Error::AssignmentClosed(assignment_id));
    }
    if end_time < current.begin_time {
      return Err(Error::InvalidAssignmentEnd);
    }

    let end_str = encode_dt(end_time);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE wearable_assignments SET end_time = ?2 WHERE assignment_id = ?1",
          rusqlite::params![id_str, end_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Persist a computed profile under a fresh id.
  pub async fn record_profile(&self, input: NewFallRiskProfile) -> Result<FallRiskProfile> {
    input.validate()?;
    let profile = input.into_profile(Uuid::new_v4());

    let id_str = encode_uuid(profile.profile_id);
    let wearable = profile.wearable_id.clone();
    let floor_str = profile.floor_id.map(encode_uuid);
    let created_str = encode_dt(profile.creation_time);
    let begin_str = encode_dt(profile.begin_time);
    let end_str = encode_dt(profile.end_time);
    let (speed, length, frequency) =
      (profile.walking_speed, profile.step_length, profile.step_frequency);
    let rms = profile.rms_vertical_acceleration;
    let hidden = profile.hidden;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fall_risk_profiles (
             profile_id, wearable_id, floor_id, creation_time, begin_time, end_time,
             walking_speed, step_length, step_frequency, rms_vertical_acceleration, hidden
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            wearable,
            floor_str,
            created_str,
            begin_str,
            end_str,
            speed,
            length,
            frequency,
            rms,
            hidden,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  /// A single profile with its note and removal, removed or not.
  pub async fn profile(&self, profile_id: Uuid) -> Result<Option<FallRiskProfile>> {
    let id_str = encode_uuid(profile_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PROFILE_COLUMNS}
           FROM fall_risk_profiles p
           LEFT JOIN fall_risk_profile_removals r ON r.profile_id = p.profile_id
           WHERE p.profile_id = ?1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    let mut profile = raw.into_profile()?;
    profile.note = self.note(profile_id).await?;
    Ok(Some(profile))
  }

  pub async fn set_hidden(&self, profile_id: Uuid, hidden: bool) -> Result<()> {
    let id_str = encode_uuid(profile_id);
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE fall_risk_profiles SET hidden = ?2 WHERE profile_id = ?1",
          rusqlite::params![id_str, hidden],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::ProfileNotFound(profile_id));
    }
    Ok(())
  }

  /// Withdraw a profile. It stays stored but no query returns it again.
  pub async fn remove_profile(
    &self,
    profile_id: Uuid,
    reason: RemovalReason,
    specification_other: Option<String>,
    removed_by: Uuid,
  ) -> Result<Removal> {
    let existing = self
      .profile(profile_id)
      .await?
      .ok_or(Error::ProfileNotFound(profile_id))?;
    if existing.is_removed() {
      return Err(Error::AlreadyRemoved(profile_id));
    }

    let removal = Removal {
      reason,
      specification_other,
      removed_by,
      removed_at: Utc::now(),
    };

    let id_str = encode_uuid(profile_id);
    let reason_str = encode_reason(reason);
    let other = removal.specification_other.clone();
    let by_str = encode_uuid(removed_by);
    let at_str = encode_dt(removal.removed_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fall_risk_profile_removals
             (profile_id, reason, specification_other, removed_by, removed_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, reason_str, other, by_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(%profile_id, %reason, "removed fall risk profile");
    Ok(removal)
  }

  /// Create, update or delete the note of a profile. An empty `value`
  /// deletes the note and returns `None`.
  pub async fn put_note(&self, profile_id: Uuid, value: &str, author: Uuid) -> Result<Option<Note>> {
    if self.profile(profile_id).await?.is_none() {
      return Err(Error::ProfileNotFound(profile_id));
    }
    let id_str = encode_uuid(profile_id);

    if value.is_empty() {
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "DELETE FROM fall_risk_profile_notes WHERE profile_id = ?1",
            rusqlite::params![id_str],
          )?;
          Ok(())
        })
        .await?;
      return Ok(None);
    }

    let now = Utc::now();
    let note = match self.note(profile_id).await? {
      Some(existing) => Note {
        value: value.to_owned(),
        updated_at: Some(now),
        ..existing
      },
      None => Note {
        value:      value.to_owned(),
        created_at: now,
        updated_at: None,
        created_by: author,
      },
    };

    let value_str = note.value.clone();
    let created_str = encode_dt(note.created_at);
    let updated_str = note.updated_at.map(encode_dt);
    let by_str = encode_uuid(note.created_by);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fall_risk_profile_notes (profile_id, value, created_at, updated_at, created_by)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (profile_id) DO UPDATE SET
             value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![id_str, value_str, created_str, updated_str, by_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Some(note))
  }
}

// ─── GaitSource impl ─────────────────────────────────────────────────────────

impl GaitSource for SqliteStore {
  type Error = Error;

  async fn footsteps(&self, wearable_ids: &[String], window: TimeWindow) -> Result<Vec<Footstep>> {
    if window.is_inverted() || wearable_ids.is_empty() {
      return Ok(Vec::new());
    }
    let begin_str = encode_dt(window.begin);
    let end_str = encode_dt(window.end);
    let ids = wearable_ids.to_vec();

    let raws: Vec<RawFootstep> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
          "SELECT wearable_id, floor_id, time, x, y
           FROM footsteps
           WHERE time >= ? AND time <= ?
             AND wearable_id IN ({placeholders})
           ORDER BY time ASC, footstep_id ASC"
        );
        let params = [begin_str, end_str].into_iter().chain(ids);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawFootstep {
              wearable_id: row.get(0)?,
              floor_id:    row.get(1)?,
              time:        row.get(2)?,
              x:           row.get(3)?,
              y:           row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFootstep::into_footstep).collect()
  }

  async fn wearable_assignments(
    &self,
    user_id: Uuid,
    window: TimeWindow,
  ) -> Result<Vec<WearableAssignment>> {
    if window.is_inverted() {
      return Ok(Vec::new());
    }
    let user_str = encode_uuid(user_id);
    let begin_str = encode_dt(window.begin);
    let end_str = encode_dt(window.end);

    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT assignment_id, user_id, wearable_id, begin_time, end_time
           FROM wearable_assignments
           WHERE user_id = ?1
             AND begin_time <= ?3
             AND (end_time IS NULL OR end_time >= ?2)
           ORDER BY begin_time DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, begin_str, end_str], |row| {
            Ok(RawAssignment {
              assignment_id: row.get(0)?,
              user_id:       row.get(1)?,
              wearable_id:   row.get(2)?,
              begin_time:    row.get(3)?,
              end_time:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn fall_risk_profiles(
    &self,
    wearable_id: &str,
    window: TimeWindow,
    include_hidden: bool,
  ) -> Result<Vec<FallRiskProfile>> {
    self
      .query_profiles(
        wearable_id,
        window,
        include_hidden,
        "p.creation_time BETWEEN ?2 AND ?3",
        "p.creation_time ASC",
      )
      .await
  }

  async fn fall_risk_profiles_spanning(
    &self,
    wearable_id: &str,
    window: TimeWindow,
    include_hidden: bool,
  ) -> Result<Vec<FallRiskProfile>> {
    self
      .query_profiles(
        wearable_id,
        window,
        include_hidden,
        "p.begin_time <= ?3 AND p.end_time >= ?2",
        "p.begin_time DESC",
      )
      .await
  }

  async fn note(&self, profile_id: Uuid) -> Result<Option<Note>> {
    let id_str = encode_uuid(profile_id);

    let raw: Option<RawNote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value, created_at, updated_at, created_by
               FROM fall_risk_profile_notes WHERE profile_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawNote {
                  value:      row.get(0)?,
                  created_at: row.get(1)?,
                  updated_at: row.get(2)?,
                  created_by: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNote::into_note).transpose()
  }
}
