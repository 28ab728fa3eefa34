//! Presence debounce and contact tracking.
//!
//! The tracker turns the per-poll stream of calibrated samples (or their
//! absence) into at most [`MAX_CONTACTS`] contacts. New contacts stay pending
//! until enough samples arrive close to their first one; stable contacts
//! survive short dropouts and are released only after a run of absent polls.
//! A contact that stops matching while another keeps reporting expires once
//! it has missed two polls and `contact_grace_ms` has passed.

use heapless::Vec;

use crate::{
    config::DebounceConfig,
    types::{Contact, TouchPoint, MAX_CONTACTS},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackedContact {
    /// Slot index, fixed for the contact's lifetime.
    pub slot: u8,
    pub contact: Contact,
}

/// Tracker output for one poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFrame {
    pub now_ms: u64,
    /// Stable contacts only, in slot order.
    pub contacts: Vec<TrackedContact, MAX_CONTACTS>,
    pub pending: u8,
    /// The sample of this poll, if it was matched to a stable contact.
    pub latest: Option<TouchPoint>,
    /// This poll's sample could not be placed in any slot.
    pub ignored: bool,
    /// Running total of ignored samples.
    pub ignored_samples: u16,
}

impl ContactFrame {
    pub fn count(&self) -> usize {
        self.contacts.len()
    }

    pub fn slot(&self, slot: u8) -> Option<&Contact> {
        self.contacts
            .iter()
            .find(|tracked| tracked.slot == slot)
            .map(|tracked| &tracked.contact)
    }
}

// Samples of a pending contact are compared against its first sample, so a
// slow drift cannot walk a contact into place.
#[derive(Clone, Copy, Debug)]
struct Slot {
    contact: Contact,
    anchor: TouchPoint,
    /// Present polls since this slot last matched.
    missed: u8,
}

impl Slot {
    fn new(point: TouchPoint) -> Self {
        Self {
            contact: Contact::pending(point),
            anchor: point,
            missed: 0,
        }
    }

    // Alternating contacts each miss one poll between matches, so a slot
    // only goes stale after two misses and the grace period.
    fn stale(&self, now_ms: u64, grace_ms: u64) -> bool {
        self.missed >= 2 && now_ms.saturating_sub(self.contact.last_seen_ms) > grace_ms
    }
}

pub struct ContactTracker {
    config: DebounceConfig,
    slots: [Option<Slot>; MAX_CONTACTS],
    absent_polls: u8,
    ignored_samples: u16,
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new(DebounceConfig::DEFAULT)
    }
}

impl ContactTracker {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            slots: [None; MAX_CONTACTS],
            absent_polls: 0,
            ignored_samples: 0,
        }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// Samples dropped because both slots were taken.
    pub fn ignored_samples(&self) -> u16 {
        self.ignored_samples
    }

    pub fn reset(&mut self) {
        self.slots = [None; MAX_CONTACTS];
        self.absent_polls = 0;
    }

    /// Feeds one poll: `Some` for a present, calibrated sample, `None` when
    /// the panel reported no contact or pressure stayed under threshold.
    pub fn update(&mut self, now_ms: u64, sample: Option<TouchPoint>) -> ContactFrame {
        let mut latest = None;
        let mut ignored = false;
        match sample {
            Some(point) => {
                self.absent_polls = 0;
                match self.assign(now_ms, point) {
                    Some(true) => latest = Some(point),
                    Some(false) => {}
                    None => ignored = true,
                }
            }
            None => self.observe_absence(),
        }
        self.frame(now_ms, latest, ignored)
    }

    fn observe_absence(&mut self) {
        self.absent_polls = self.absent_polls.saturating_add(1);
        // Pending contacts need an unbroken run of present polls.
        for slot in &mut self.slots {
            if slot.is_some_and(|slot| !slot.contact.stable) {
                *slot = None;
            }
        }
        if self.absent_polls >= self.config.release_polls.max(1) {
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if let Some(slot) = slot.take() {
                    log::trace!(
                        "touch: contact_released slot={} held_ms={}",
                        index,
                        slot.contact.held_ms()
                    );
                }
            }
        }
    }

    // Every slot except `matched` missed this poll.
    fn age_others(&mut self, now_ms: u64, matched: Option<usize>) {
        let grace_ms = self.config.contact_grace_ms;
        for (index, entry) in self.slots.iter_mut().enumerate() {
            if Some(index) == matched {
                continue;
            }
            let Some(slot) = entry.as_mut() else {
                continue;
            };
            slot.missed = slot.missed.saturating_add(1);
            if slot.stale(now_ms, grace_ms) {
                log::trace!(
                    "touch: contact_expired slot={} missed={}",
                    index,
                    slot.missed
                );
                *entry = None;
            }
        }
    }

    // Returns whether the sample landed on a stable contact, or `None` when
    // it was ignored. Matching runs before expiry so a slow poll cadence
    // cannot expire the contact the sample belongs to.
    fn assign(&mut self, now_ms: u64, point: TouchPoint) -> Option<bool> {
        let press_polls = self.config.press_polls.max(1);
        if let Some(index) = self.matching_slot(point) {
            self.age_others(now_ms, Some(index));
            let slot = self.slots[index].as_mut()?;
            slot.missed = 0;
            slot.contact.observe(point);
            if !slot.contact.stable && slot.contact.samples >= press_polls {
                slot.contact.stable = true;
                log::trace!(
                    "touch: contact_stable slot={} x={} y={}",
                    index,
                    point.x,
                    point.y
                );
            }
            return Some(slot.contact.stable);
        }

        self.age_others(now_ms, None);
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            let mut slot = Slot::new(point);
            slot.contact.stable = press_polls <= 1;
            self.slots[index] = Some(slot);
            return Some(slot.contact.stable);
        }

        self.ignored_samples = self.ignored_samples.saturating_add(1);
        log::trace!("touch: sample_ignored x={} y={}", point.x, point.y);
        None
    }

    // Stable contacts follow their latest sample; pending ones must stay
    // near their anchor.
    fn matching_slot(&self, point: TouchPoint) -> Option<usize> {
        let occupied = || {
            self.slots
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.map(|slot| (index, slot)))
        };
        occupied()
            .filter(|(_, slot)| {
                slot.contact.stable
                    && slot.contact.point.within(&point, self.config.match_radius_px)
            })
            .min_by_key(|(_, slot)| slot.contact.point.squared_distance(&point))
            .or_else(|| {
                occupied()
                    .filter(|(_, slot)| {
                        !slot.contact.stable
                            && slot.anchor.within(&point, self.config.stable_tolerance_px)
                    })
                    .min_by_key(|(_, slot)| slot.anchor.squared_distance(&point))
            })
            .map(|(index, _)| index)
    }

    fn frame(&self, now_ms: u64, latest: Option<TouchPoint>, ignored: bool) -> ContactFrame {
        let mut contacts = Vec::new();
        let mut pending = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(slot) if slot.contact.stable => {
                    // Capacity equals the slot count.
                    let _ = contacts.push(TrackedContact {
                        slot: index as u8,
                        contact: slot.contact,
                    });
                }
                Some(_) => pending += 1,
                None => {}
            }
        }
        ContactFrame {
            now_ms,
            contacts,
            pending,
            latest,
            ignored,
            ignored_samples: self.ignored_samples,
        }
    }
}

#[cfg(test)]
mod tests;
