use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Event, EventKind, ParticipantRef, SlotPool, SoloRegistration, TeamMember, TeamRegistration,
    TeamRosterKind,
};

/// One member of an event's confirmed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfirmedEntry {
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub bucket: Option<String>,
    /// Absent for walk-in admissions, which never held a registration row.
    pub registration_id: Option<Uuid>,
    pub entrant: ParticipantRef,
}

/// Result of a successful confirmation. The point credit is computed here
/// but applied by the caller, which knows whether the entrant owns a
/// ledger.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub registration_id: Option<Uuid>,
    pub entry: ConfirmedEntry,
    pub registration_points: i32,
}

/// Result of a successful release.
#[derive(Debug, Clone)]
pub struct Release {
    pub registration_id: Option<Uuid>,
    pub entry_id: Uuid,
    pub npr_penalty: i32,
}

/// The full allocation state of one event: slot pool, registration lists
/// and confirmed set. This is the only type permitted to change slot
/// counts and confirmed-set membership; services load it under a row lock,
/// apply one operation and persist the outcome in the same transaction.
///
/// Invariants held by every operation:
/// - per bucket, `remaining + |confirmed|` never changes across a
///   confirm/release pair;
/// - an entrant appears in a bucket's confirmed set at most once;
/// - a registration row's `confirmed` flag always matches confirmed-set
///   membership of its entrant;
/// - `remaining` never goes negative, and a confirm that would overdraw
///   fails before mutating anything.
#[derive(Debug, Clone)]
pub struct EventRoster {
    pub event: Event,
    pub pool: SlotPool,
    pub solo: Vec<SoloRegistration>,
    pub teams: Vec<TeamRegistration>,
    pub team_members: Vec<TeamMember>,
    pub confirmed: Vec<ConfirmedEntry>,
}

impl EventRoster {
    fn ensure_live(&self) -> Result<()> {
        if self.event.deleted {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    fn entry_index(&self, entrant: &ParticipantRef, bucket: Option<&str>) -> Option<usize> {
        self.confirmed
            .iter()
            .position(|e| e.bucket.as_deref() == bucket && e.entrant == *entrant)
    }

    pub fn is_confirmed(&self, participant_id: Uuid, bucket: Option<&str>) -> bool {
        self.entry_index(&ParticipantRef::resolved(participant_id), bucket)
            .is_some()
    }

    /// Confirmed in any bucket of this event. Guards point awards.
    pub fn is_confirmed_anywhere(&self, participant_id: Uuid) -> bool {
        let re = ParticipantRef::resolved(participant_id);
        self.confirmed.iter().any(|e| e.entrant == re)
    }

    /// Move a registered participant into the confirmed set.
    ///
    /// Failure ladder, each checked before any mutation: bucket shape
    /// (`InvalidArgument`), registration presence (`NotRegistered`),
    /// capacity (`NoCapacity`), prior confirmation (`AlreadyConfirmed`).
    pub fn confirm(&mut self, participant_id: Uuid, bucket: Option<&str>) -> Result<Confirmation> {
        self.ensure_live()?;
        let slots = self.pool.bucket(bucket)?;
        let entrant = ParticipantRef::resolved(participant_id);

        let registration_id = match self.event.kind()? {
            EventKind::Solo => {
                self.solo
                    .iter()
                    .find(|r| r.entrant() == entrant && r.bucket.as_deref() == bucket)
                    .ok_or(StorageError::NotRegistered)?
                    .registration_id
            }
            EventKind::Team => {
                self.teams
                    .iter()
                    .find(|r| r.registered_by == participant_id)
                    .ok_or(StorageError::NotRegistered)?
                    .registration_id
            }
        };

        if slots.remaining == 0 {
            return Err(StorageError::NoCapacity);
        }
        if self.entry_index(&entrant, bucket).is_some() {
            return Err(StorageError::AlreadyConfirmed);
        }

        self.set_registration_confirmed(registration_id, true);
        let entry = ConfirmedEntry {
            entry_id: Uuid::new_v4(),
            event_id: self.event.event_id,
            bucket: bucket.map(str::to_owned),
            registration_id: Some(registration_id),
            entrant,
        };
        self.confirmed.push(entry.clone());
        self.pool.take(bucket)?;

        Ok(Confirmation {
            registration_id: Some(registration_id),
            entry,
            registration_points: self.event.points().registration,
        })
    }

    /// Admit a walk-in straight into the confirmed set, bypassing the
    /// registration precondition. Capacity and duplicate checks still
    /// apply; no registration row is touched and no points are credited.
    pub fn admit_walk_in(
        &mut self,
        participant_id: Uuid,
        bucket: Option<&str>,
    ) -> Result<Confirmation> {
        self.ensure_live()?;
        let slots = self.pool.bucket(bucket)?;
        let entrant = ParticipantRef::resolved(participant_id);

        if slots.remaining == 0 {
            return Err(StorageError::NoCapacity);
        }
        if self.entry_index(&entrant, bucket).is_some() {
            return Err(StorageError::AlreadyConfirmed);
        }

        let entry = ConfirmedEntry {
            entry_id: Uuid::new_v4(),
            event_id: self.event.event_id,
            bucket: bucket.map(str::to_owned),
            registration_id: None,
            entrant,
        };
        self.confirmed.push(entry.clone());
        self.pool.take(bucket)?;

        Ok(Confirmation {
            registration_id: None,
            entry,
            registration_points: 0,
        })
    }

    /// Inverse of `confirm`: drop the entrant from the confirmed set,
    /// clear the registration flag and refund the slot. The caller debits
    /// the returned `npr` penalty from the departing ledger.
    pub fn release(&mut self, participant_id: Uuid, bucket: Option<&str>) -> Result<Release> {
        self.ensure_live()?;
        let entrant = ParticipantRef::resolved(participant_id);
        let idx = self
            .entry_index(&entrant, bucket)
            .ok_or(StorageError::NotConfirmed)?;

        let entry = self.confirmed.remove(idx);
        if let Some(registration_id) = entry.registration_id {
            self.set_registration_confirmed(registration_id, false);
        }
        self.pool.refund(bucket)?;

        Ok(Release {
            registration_id: entry.registration_id,
            entry_id: entry.entry_id,
            npr_penalty: self.event.points().npr,
        })
    }

    fn set_registration_confirmed(&mut self, registration_id: Uuid, confirmed: bool) {
        if let Some(r) = self
            .solo
            .iter_mut()
            .find(|r| r.registration_id == registration_id)
        {
            r.confirmed = confirmed;
        }
        if let Some(r) = self
            .teams
            .iter_mut()
            .find(|r| r.registration_id == registration_id)
        {
            r.confirmed = confirmed;
        }
    }

    /// First placeholder the owner still holds in this event's solo list.
    pub fn first_solo_placeholder(&self, owner: Uuid) -> Option<ParticipantRef> {
        self.solo
            .iter()
            .filter(|r| r.registered_by == owner)
            .map(|r| r.entrant())
            .find(|re| re.is_placeholder_of(owner))
    }

    /// Rewrite every occurrence of `from` in the owner's solo registrations
    /// and in the confirmed set to the given resolved participant. Returns
    /// the number of registration rows rewritten.
    pub fn substitute_solo(
        &mut self,
        owner: Uuid,
        from: &ParticipantRef,
        to: Uuid,
    ) -> Result<usize> {
        self.ensure_live()?;
        let to_ref = ParticipantRef::resolved(to);
        let mut rewritten = 0;

        for reg in self
            .solo
            .iter_mut()
            .filter(|r| r.registered_by == owner && r.entrant() == *from)
        {
            reg.set_entrant(to_ref);
            rewritten += 1;
        }
        if rewritten == 0 {
            return Err(StorageError::NotFound);
        }
        for entry in self.confirmed.iter_mut().filter(|e| e.entrant == *from) {
            entry.entrant = to_ref;
        }
        Ok(rewritten)
    }

    /// First placeholder position in the given roster list of the owner's
    /// team registration.
    pub fn first_team_placeholder(
        &self,
        owner: Uuid,
        roster: TeamRosterKind,
    ) -> Option<(Uuid, i32)> {
        let team_ids: Vec<Uuid> = self
            .teams
            .iter()
            .filter(|t| t.registered_by == owner)
            .map(|t| t.registration_id)
            .collect();
        self.team_members
            .iter()
            .find(|m| {
                team_ids.contains(&m.registration_id)
                    && m.roster == roster.as_str()
                    && m.member_id.is_none()
            })
            .map(|m| (m.registration_id, m.position))
    }

    /// Resolve one team-member position to a real participant.
    pub fn fill_team_position(
        &mut self,
        registration_id: Uuid,
        roster: TeamRosterKind,
        position: i32,
        to: Uuid,
    ) -> Result<()> {
        self.ensure_live()?;
        let member = self
            .team_members
            .iter_mut()
            .find(|m| {
                m.registration_id == registration_id
                    && m.roster == roster.as_str()
                    && m.position == position
            })
            .ok_or(StorageError::NotFound)?;
        member.set_member(ParticipantRef::resolved(to));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str) -> Event {
        Event {
            event_id: Uuid::new_v4(),
            name: "100m dash".into(),
            slug: "100m-dash".into(),
            kind: kind.into(),
            status: "upcoming".into(),
            deleted: false,
            registration_points: 10,
            first_points: 50,
            second_points: 30,
            third_points: 20,
            qualification_points: 5,
            npr_points: 8,
            npq_points: 4,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    fn roster(pool: SlotPool) -> EventRoster {
        EventRoster {
            event: event("solo"),
            pool,
            solo: vec![],
            teams: vec![],
            team_members: vec![],
            confirmed: vec![],
        }
    }

    fn register(roster: &mut EventRoster, entrant: ParticipantRef, bucket: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        roster.solo.push(SoloRegistration {
            registration_id: id,
            event_id: roster.event.event_id,
            registered_by: entrant.participant_id().unwrap_or_else(Uuid::new_v4),
            entrant_id: entrant.participant_id(),
            placeholder_ordinal: match entrant {
                ParticipantRef::Placeholder { ordinal, .. } => Some(ordinal),
                _ => None,
            },
            bucket: bucket.map(str::to_owned),
            confirmed: false,
            created_at: chrono::NaiveDateTime::default(),
        });
        id
    }

    /// I3: every registration flag matches confirmed-set membership.
    fn assert_flag_set_consistent(r: &EventRoster) {
        for reg in &r.solo {
            let in_set = r
                .confirmed
                .iter()
                .any(|e| e.entrant == reg.entrant() && e.bucket == reg.bucket);
            assert_eq!(reg.confirmed, in_set, "I3 violated for {:?}", reg.entrant());
        }
    }

    #[test]
    fn scalar_confirm_then_duplicate() {
        // Scenario A: slots = 3, confirm once, confirm again.
        let mut r = roster(SlotPool::scalar(3));
        let p1 = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(p1), None);

        let outcome = r.confirm(p1, None).unwrap();
        assert_eq!(outcome.registration_points, 10);
        assert_eq!(r.pool.remaining(None).unwrap(), 2);
        assert_eq!(r.confirmed.len(), 1);
        assert_flag_set_consistent(&r);

        assert!(matches!(
            r.confirm(p1, None),
            Err(StorageError::AlreadyConfirmed)
        ));
        assert_eq!(r.pool.remaining(None).unwrap(), 2);
        assert_eq!(r.confirmed.len(), 1);
    }

    #[test]
    fn categorical_buckets_fill_independently() {
        // Scenario B: {male: 1, female: 1}.
        let mut r = roster(SlotPool::categorical([
            ("male".to_string(), 1),
            ("female".to_string(), 1),
        ]));
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(p1), Some("male"));
        register(&mut r, ParticipantRef::resolved(p2), Some("male"));
        register(&mut r, ParticipantRef::resolved(p2), Some("female"));

        r.confirm(p1, Some("male")).unwrap();
        assert_eq!(r.pool.remaining(Some("male")).unwrap(), 0);

        assert!(matches!(
            r.confirm(p2, Some("male")),
            Err(StorageError::NoCapacity)
        ));

        r.confirm(p2, Some("female")).unwrap();
        assert_eq!(r.pool.remaining(Some("female")).unwrap(), 0);
        assert_flag_set_consistent(&r);
    }

    #[test]
    fn confirm_requires_registration() {
        let mut r = roster(SlotPool::scalar(2));
        assert!(matches!(
            r.confirm(Uuid::new_v4(), None),
            Err(StorageError::NotRegistered)
        ));
        assert_eq!(r.pool.remaining(None).unwrap(), 2);
    }

    #[test]
    fn confirm_requires_matching_bucket() {
        let mut r = roster(SlotPool::categorical([
            ("light_weight".to_string(), 2),
            ("heavy_weight".to_string(), 2),
        ]));
        let p1 = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(p1), Some("light_weight"));

        assert!(matches!(
            r.confirm(p1, Some("heavy_weight")),
            Err(StorageError::NotRegistered)
        ));
    }

    #[test]
    fn capacity_floor_mutates_nothing() {
        let mut r = roster(SlotPool::scalar(1));
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(p1), None);
        register(&mut r, ParticipantRef::resolved(p2), None);

        r.confirm(p1, None).unwrap();
        assert!(matches!(r.confirm(p2, None), Err(StorageError::NoCapacity)));
        assert_eq!(r.pool.remaining(None).unwrap(), 0);
        assert_eq!(r.confirmed.len(), 1);
        assert_flag_set_consistent(&r);
    }

    #[test]
    fn conservation_across_confirm_release_sequences() {
        let capacity = 3u32;
        let mut r = roster(SlotPool::scalar(capacity));
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            register(&mut r, ParticipantRef::resolved(*id), None);
        }

        let check = |r: &EventRoster| {
            assert_eq!(
                r.pool.remaining(None).unwrap() + r.confirmed.len() as u32,
                capacity
            );
            assert_flag_set_consistent(r);
        };

        r.confirm(ids[0], None).unwrap();
        check(&r);
        r.confirm(ids[1], None).unwrap();
        check(&r);
        r.release(ids[0], None).unwrap();
        check(&r);
        r.confirm(ids[2], None).unwrap();
        check(&r);
        r.confirm(ids[3], None).unwrap();
        check(&r);
        assert!(r.confirm(ids[4], None).is_err());
        check(&r);
        r.release(ids[3], None).unwrap();
        check(&r);
        r.confirm(ids[4], None).unwrap();
        check(&r);
    }

    #[test]
    fn release_clears_flag_and_charges_npr() {
        let mut r = roster(SlotPool::scalar(1));
        let p1 = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(p1), None);

        r.confirm(p1, None).unwrap();
        let release = r.release(p1, None).unwrap();
        assert_eq!(release.npr_penalty, 8);
        assert_eq!(r.pool.remaining(None).unwrap(), 1);
        assert!(r.confirmed.is_empty());
        assert!(!r.solo[0].confirmed);
        assert_flag_set_consistent(&r);

        assert!(matches!(
            r.release(p1, None),
            Err(StorageError::NotConfirmed)
        ));
    }

    #[test]
    fn replacement_dance_restores_slot_count() {
        // Scenario C: departing confirmed in a full male bucket, arriving
        // takes the manufactured slot, pool ends where it started.
        let mut r = roster(SlotPool::categorical([("male".to_string(), 1)]));
        let departing = Uuid::new_v4();
        let arriving = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(departing), Some("male"));
        register(&mut r, ParticipantRef::resolved(arriving), Some("male"));

        r.confirm(departing, Some("male")).unwrap();
        assert_eq!(r.pool.remaining(Some("male")).unwrap(), 0);

        r.pool.inflate(Some("male")).unwrap();
        let confirmation = r.confirm(arriving, Some("male")).unwrap();
        let release = r.release(departing, Some("male")).unwrap();
        r.pool.deflate(Some("male")).unwrap();

        assert_eq!(r.pool.remaining(Some("male")).unwrap(), 0);
        assert_eq!(confirmation.registration_points, 10);
        assert_eq!(release.npr_penalty, 8);
        assert!(r.is_confirmed(arriving, Some("male")));
        assert!(!r.is_confirmed(departing, Some("male")));
        assert_flag_set_consistent(&r);
    }

    #[test]
    fn walk_in_respects_capacity_and_duplicates() {
        let mut r = roster(SlotPool::scalar(2));
        let otse = Uuid::new_v4();

        let outcome = r.admit_walk_in(otse, None).unwrap();
        assert_eq!(outcome.registration_points, 0);
        assert!(outcome.registration_id.is_none());
        assert_eq!(r.pool.remaining(None).unwrap(), 1);

        // Capacity still available, so the duplicate is what fails.
        assert!(matches!(
            r.admit_walk_in(otse, None),
            Err(StorageError::AlreadyConfirmed)
        ));

        r.admit_walk_in(Uuid::new_v4(), None).unwrap();
        assert!(matches!(
            r.admit_walk_in(Uuid::new_v4(), None),
            Err(StorageError::NoCapacity)
        ));
        assert_eq!(r.confirmed.len(), 2);
    }

    #[test]
    fn deleted_event_rejects_all_operations() {
        let mut r = roster(SlotPool::scalar(3));
        let p1 = Uuid::new_v4();
        register(&mut r, ParticipantRef::resolved(p1), None);
        r.event.deleted = true;

        assert!(matches!(r.confirm(p1, None), Err(StorageError::NotFound)));
        assert!(matches!(
            r.admit_walk_in(p1, None),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn substitution_rewrites_registration_and_confirmed_set() {
        // Scenario D, solo shape: the placeholder disappears from both
        // representations and the same resolved ID lands in both.
        let mut r = roster(SlotPool::scalar(2));
        let owner = Uuid::new_v4();
        let placeholder = ParticipantRef::placeholder(owner, 0);
        let reg_id = {
            let id = Uuid::new_v4();
            r.solo.push(SoloRegistration {
                registration_id: id,
                event_id: r.event.event_id,
                registered_by: owner,
                entrant_id: None,
                placeholder_ordinal: Some(0),
                bucket: None,
                confirmed: false,
                created_at: chrono::NaiveDateTime::default(),
            });
            id
        };
        // Placeholder occupies a confirmed slot (I5 allows this).
        r.solo[0].confirmed = true;
        r.confirmed.push(ConfirmedEntry {
            entry_id: Uuid::new_v4(),
            event_id: r.event.event_id,
            bucket: None,
            registration_id: Some(reg_id),
            entrant: placeholder,
        });
        r.pool.take(None).unwrap();

        let real = Uuid::new_v4();
        let rewritten = r.substitute_solo(owner, &placeholder, real).unwrap();
        assert_eq!(rewritten, 1);
        assert_eq!(r.solo[0].entrant(), ParticipantRef::resolved(real));
        assert_eq!(r.confirmed[0].entrant, ParticipantRef::resolved(real));
        // No slot movement.
        assert_eq!(r.pool.remaining(None).unwrap(), 1);
    }

    #[test]
    fn substitution_of_unknown_ref_fails() {
        let mut r = roster(SlotPool::scalar(1));
        let owner = Uuid::new_v4();
        assert!(matches!(
            r.substitute_solo(owner, &ParticipantRef::placeholder(owner, 0), Uuid::new_v4()),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn team_confirm_takes_one_slot() {
        let mut r = roster(SlotPool::scalar(1));
        r.event = event("team");
        let registerer = Uuid::new_v4();
        let reg_id = Uuid::new_v4();
        r.teams.push(TeamRegistration {
            registration_id: reg_id,
            event_id: r.event.event_id,
            registered_by: registerer,
            team_name: "Crimson".into(),
            confirmed: false,
            created_at: chrono::NaiveDateTime::default(),
        });

        r.confirm(registerer, None).unwrap();
        assert!(r.teams[0].confirmed);
        assert_eq!(r.pool.remaining(None).unwrap(), 0);
        assert!(matches!(
            r.confirm(registerer, None),
            Err(StorageError::AlreadyConfirmed)
        ));
    }

    #[test]
    fn team_placeholder_positions_fill_in_order() {
        let mut r = roster(SlotPool::scalar(1));
        r.event = event("team");
        let owner = Uuid::new_v4();
        let reg_id = Uuid::new_v4();
        r.teams.push(TeamRegistration {
            registration_id: reg_id,
            event_id: r.event.event_id,
            registered_by: owner,
            team_name: "Crimson".into(),
            confirmed: false,
            created_at: chrono::NaiveDateTime::default(),
        });
        for (position, ordinal) in [(0, 0), (1, 1)] {
            r.team_members.push(TeamMember {
                registration_id: reg_id,
                roster: "team".into(),
                position,
                member_id: None,
                placeholder_ordinal: Some(ordinal),
            });
        }

        let (reg, pos) = r.first_team_placeholder(owner, TeamRosterKind::Team).unwrap();
        assert_eq!((reg, pos), (reg_id, 0));
        let real = Uuid::new_v4();
        r.fill_team_position(reg, TeamRosterKind::Team, pos, real).unwrap();

        let (_, next_pos) = r.first_team_placeholder(owner, TeamRosterKind::Team).unwrap();
        assert_eq!(next_pos, 1);
        assert_eq!(r.team_members[0].member_id, Some(real));
    }
}
