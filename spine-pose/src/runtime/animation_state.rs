use crate::runtime::animation::{apply_rotate, bracket, discrete_frame, signum};
use crate::{
    wrap_degrees, Animation, AttachmentTimeline, Error, Event, MixBlend, MixDirection,
    RotateTimeline, Skeleton, SkeletonData, Timeline,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, LazyLock};

const EMPTY_ANIMATION_NAME: &str = "<empty>";

static EMPTY_ANIMATION: LazyLock<Animation> =
    LazyLock::new(|| Animation::new(EMPTY_ANIMATION_NAME, Vec::new(), 0.0));

// Slot attachment bookkeeping, relative to `AnimationState::unkeyed_state`.
const ATTACHMENT_SETUP: i32 = 1;
const ATTACHMENT_CURRENT: i32 = 2;

/// How a mixing-out timeline is applied, decided once per change of the mixing graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimelineMode {
    /// A lower entry already keys this property.
    Subsequent,
    /// First to key the property; mixes out from the setup pose.
    First,
    /// The entry mixing in holds the previous pose and a lower entry keys the property.
    HoldSubsequent,
    /// The entry mixing in keys the same property, so this one is held at full alpha.
    HoldFirst,
    /// Held, then faded out as a later entry that doesn't key the property mixes in.
    HoldMix,
}

fn animation_of(data: &SkeletonData, index: Option<usize>) -> &Animation {
    match index {
        Some(index) => &data.animations[index],
        None => &EMPTY_ANIMATION,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct EntryId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct EntrySlot {
    generation: u32,
    entry: Option<TrackEntry>,
}

/// Mix durations between animations of one skeleton.
#[derive(Clone, Debug)]
pub struct AnimationStateData {
    pub skeleton_data: Arc<SkeletonData>,
    /// Used when no duration was set for a pair.
    pub default_mix: f32,
    mixes: HashMap<(usize, usize), f32>,
}

impl AnimationStateData {
    pub fn new(skeleton_data: Arc<SkeletonData>) -> Self {
        Self {
            skeleton_data,
            default_mix: 0.0,
            mixes: HashMap::new(),
        }
    }

    pub fn set_mix(&mut self, from: &str, to: &str, duration: f32) -> Result<(), Error> {
        if duration.is_nan() || duration < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("mix duration must be >= 0, got {duration}"),
            });
        }
        let (from_index, _) =
            self.skeleton_data
                .animation(from)
                .ok_or_else(|| Error::UnknownAnimation {
                    name: from.to_string(),
                })?;
        let (to_index, _) =
            self.skeleton_data
                .animation(to)
                .ok_or_else(|| Error::UnknownAnimation {
                    name: to.to_string(),
                })?;
        self.mixes.insert((from_index, to_index), duration);
        Ok(())
    }

    /// Mix duration from `from` to `to`, or `default_mix` when none was set.
    pub fn mix(&self, from: &str, to: &str) -> f32 {
        let from = self.skeleton_data.animation(from).map(|(i, _)| i);
        let to = self.skeleton_data.animation(to).map(|(i, _)| i);
        self.mix_duration(from, to)
    }

    fn mix_duration(&self, from: Option<usize>, to: Option<usize>) -> f32 {
        match (from, to) {
            (Some(from), Some(to)) => self
                .mixes
                .get(&(from, to))
                .copied()
                .unwrap_or(self.default_mix),
            _ => self.default_mix,
        }
    }
}

/// Playback state of one animation on one track.
pub struct TrackEntry {
    pub track_index: usize,
    animation_index: Option<usize>,
    pub looped: bool,
    /// Entries mixing out hold their pose instead of fading toward setup.
    pub hold_previous: bool,
    /// Below this mix percent, a mixing-out entry still fires events.
    pub event_threshold: f32,
    pub attachment_threshold: f32,
    pub draw_order_threshold: f32,
    pub animation_start: f32,
    pub animation_end: f32,
    pub animation_last: f32,
    next_animation_last: f32,
    pub delay: f32,
    pub track_time: f32,
    pub track_last: f32,
    next_track_last: f32,
    pub track_end: f32,
    pub time_scale: f32,
    pub alpha: f32,
    pub mix_time: f32,
    pub mix_duration: f32,
    pub interrupt_alpha: f32,
    pub total_alpha: f32,
    pub mix_blend: MixBlend,
    next: Option<EntryId>,
    mixing_from: Option<EntryId>,
    mixing_to: Option<EntryId>,
    listener: Option<Box<dyn TrackEntryListener>>,
    timeline_mode: Vec<TimelineMode>,
    timeline_hold_mix: Vec<Option<EntryId>>,
    timelines_rotation: Vec<f32>,
}

impl std::fmt::Debug for TrackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackEntry")
            .field("track_index", &self.track_index)
            .field("animation_index", &self.animation_index)
            .field("looped", &self.looped)
            .field("delay", &self.delay)
            .field("track_time", &self.track_time)
            .field("track_end", &self.track_end)
            .field("mix_time", &self.mix_time)
            .field("mix_duration", &self.mix_duration)
            .field("alpha", &self.alpha)
            .field("mixing_from", &self.mixing_from)
            .field("mixing_to", &self.mixing_to)
            .field("next", &self.next)
            .finish()
    }
}

impl TrackEntry {
    fn new(track_index: usize, animation_index: Option<usize>, animation: &Animation) -> Self {
        Self {
            track_index,
            animation_index,
            looped: false,
            hold_previous: false,
            event_threshold: 0.0,
            attachment_threshold: 0.0,
            draw_order_threshold: 0.0,
            animation_start: 0.0,
            animation_end: animation.duration,
            animation_last: -1.0,
            next_animation_last: -1.0,
            delay: 0.0,
            track_time: 0.0,
            track_last: -1.0,
            next_track_last: -1.0,
            track_end: f32::MAX,
            time_scale: 1.0,
            alpha: 1.0,
            mix_time: 0.0,
            mix_duration: 0.0,
            interrupt_alpha: 1.0,
            total_alpha: 0.0,
            mix_blend: MixBlend::Replace,
            next: None,
            mixing_from: None,
            mixing_to: None,
            listener: None,
            timeline_mode: Vec::new(),
            timeline_hold_mix: Vec::new(),
            timelines_rotation: Vec::new(),
        }
    }

    /// Index into `SkeletonData::animations`, `None` for the empty animation.
    pub fn animation_index(&self) -> Option<usize> {
        self.animation_index
    }

    /// Track time mapped into `[animation_start, animation_end]`, wrapping when looping.
    pub fn animation_time(&self) -> f32 {
        if self.looped {
            let duration = self.animation_end - self.animation_start;
            if duration == 0.0 {
                return self.animation_start;
            }
            return self.track_time % duration + self.animation_start;
        }
        (self.track_time + self.animation_start).min(self.animation_end)
    }

    /// True once at least one full pass of the animation has played.
    pub fn is_complete(&self) -> bool {
        self.track_time >= self.animation_end - self.animation_start
    }

    pub fn mixing_from(&self) -> Option<TrackEntryHandle> {
        self.mixing_from.map(|id| TrackEntryHandle { id })
    }

    pub fn mixing_to(&self) -> Option<TrackEntryHandle> {
        self.mixing_to.map(|id| TrackEntryHandle { id })
    }

    /// The entry queued to play after this one.
    pub fn next(&self) -> Option<TrackEntryHandle> {
        self.next.map(|id| TrackEntryHandle { id })
    }
}

/// Reference to a [`TrackEntry`] owned by an [`AnimationState`]. Becomes stale once the entry is
/// disposed; setters on a stale handle do nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackEntryHandle {
    id: EntryId,
}

impl TrackEntryHandle {
    fn with_entry_mut(&self, state: &mut AnimationState, f: impl FnOnce(&mut TrackEntry)) {
        if let Some(entry) = state.entry_mut(self.id) {
            f(entry);
        }
    }

    pub fn is_valid(&self, state: &AnimationState) -> bool {
        state.entry(self.id).is_some()
    }

    pub fn set_listener<L: TrackEntryListener + 'static>(
        &self,
        state: &mut AnimationState,
        listener: L,
    ) {
        self.with_entry_mut(state, |entry| entry.listener = Some(Box::new(listener)));
    }

    pub fn set_looped(&self, state: &mut AnimationState, looped: bool) {
        self.with_entry_mut(state, |entry| entry.looped = looped);
    }

    pub fn set_track_time(&self, state: &mut AnimationState, track_time: f32) {
        self.with_entry_mut(state, |entry| entry.track_time = track_time);
    }

    pub fn set_track_end(&self, state: &mut AnimationState, track_end: f32) {
        self.with_entry_mut(state, |entry| entry.track_end = track_end);
    }

    pub fn set_delay(&self, state: &mut AnimationState, delay: f32) {
        self.with_entry_mut(state, |entry| entry.delay = delay);
    }

    pub fn set_time_scale(&self, state: &mut AnimationState, time_scale: f32) {
        self.with_entry_mut(state, |entry| entry.time_scale = time_scale);
    }

    pub fn set_alpha(&self, state: &mut AnimationState, alpha: f32) {
        self.with_entry_mut(state, |entry| entry.alpha = alpha);
    }

    pub fn set_mix_duration(&self, state: &mut AnimationState, mix_duration: f32) {
        self.with_entry_mut(state, |entry| entry.mix_duration = mix_duration);
    }

    pub fn set_mix_blend(&self, state: &mut AnimationState, mix_blend: MixBlend) {
        self.with_entry_mut(state, |entry| entry.mix_blend = mix_blend);
    }

    pub fn set_hold_previous(&self, state: &mut AnimationState, hold_previous: bool) {
        self.with_entry_mut(state, |entry| entry.hold_previous = hold_previous);
    }

    pub fn set_event_threshold(&self, state: &mut AnimationState, threshold: f32) {
        self.with_entry_mut(state, |entry| entry.event_threshold = threshold);
    }

    pub fn set_attachment_threshold(&self, state: &mut AnimationState, threshold: f32) {
        self.with_entry_mut(state, |entry| entry.attachment_threshold = threshold);
    }

    pub fn set_draw_order_threshold(&self, state: &mut AnimationState, threshold: f32) {
        self.with_entry_mut(state, |entry| entry.draw_order_threshold = threshold);
    }

    pub fn set_animation_start(&self, state: &mut AnimationState, animation_start: f32) {
        self.with_entry_mut(state, |entry| entry.animation_start = animation_start);
    }

    pub fn set_animation_end(&self, state: &mut AnimationState, animation_end: f32) {
        self.with_entry_mut(state, |entry| entry.animation_end = animation_end);
    }

    pub fn set_animation_last(&self, state: &mut AnimationState, animation_last: f32) {
        self.with_entry_mut(state, |entry| {
            entry.animation_last = animation_last;
            entry.next_animation_last = animation_last;
        });
    }

    /// Forgets the accumulated mixing direction of rotate timelines.
    pub fn reset_rotation_directions(&self, state: &mut AnimationState) {
        self.with_entry_mut(state, |entry| entry.timelines_rotation.clear());
    }
}

/// What a listener sees of the entry an event was fired for.
#[derive(Clone, Debug)]
pub struct TrackEntrySnapshot {
    pub handle: TrackEntryHandle,
    pub track_index: usize,
    pub animation_index: Option<usize>,
    pub animation_name: String,
    pub track_time: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnimationStateEvent {
    Start,
    Interrupt,
    End,
    Dispose,
    Complete,
    Event(Event),
}

pub trait TrackEntryListener {
    fn on_event(
        &mut self,
        state: &mut AnimationState,
        entry: &TrackEntrySnapshot,
        event: &AnimationStateEvent,
    );
}

pub trait AnimationStateListener {
    fn on_event(
        &mut self,
        state: &mut AnimationState,
        entry: &TrackEntrySnapshot,
        event: &AnimationStateEvent,
    );
}

#[derive(Clone, Debug)]
struct QueuedEvent {
    entry: EntryId,
    event: AnimationStateEvent,
}

/// Plays, queues and crossfades animations on independent tracks.
///
/// Listener callbacks never run inside a mutation: events are queued and dispatched in order once
/// the outermost call finishes. A listener may call back into the state; anything it queues is
/// dispatched after the current event.
pub struct AnimationState {
    data: AnimationStateData,
    tracks: Vec<Option<EntryId>>,
    entries: Vec<EntrySlot>,
    free_list: Vec<usize>,
    queue: VecDeque<QueuedEvent>,
    listener: Option<Box<dyn AnimationStateListener>>,
    drain_disabled: bool,
    animations_changed: bool,
    property_ids: HashSet<u64>,
    events: Vec<Event>,
    unkeyed_state: i32,
    pub time_scale: f32,
}

impl AnimationState {
    pub fn new(data: AnimationStateData) -> Self {
        Self {
            data,
            tracks: Vec::new(),
            entries: Vec::new(),
            free_list: Vec::new(),
            queue: VecDeque::new(),
            listener: None,
            drain_disabled: false,
            animations_changed: false,
            property_ids: HashSet::new(),
            events: Vec::new(),
            unkeyed_state: 0,
            time_scale: 1.0,
        }
    }

    pub fn data(&self) -> &AnimationStateData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut AnimationStateData {
        &mut self.data
    }

    pub fn set_listener<L: AnimationStateListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn tracks_len(&self) -> usize {
        self.tracks.len()
    }

    /// The entry currently playing on a track.
    pub fn current(&self, track_index: usize) -> Option<TrackEntryHandle> {
        let id = (*self.tracks.get(track_index)?)?;
        Some(TrackEntryHandle { id })
    }

    pub fn track_entry(&self, handle: TrackEntryHandle) -> Option<&TrackEntry> {
        self.entry(handle.id)
    }

    pub fn animation(&self, handle: TrackEntryHandle) -> Option<&Animation> {
        let entry = self.entry(handle.id)?;
        Some(animation_of(&self.data.skeleton_data, entry.animation_index))
    }

    /// Advances every track by `delta` seconds, starting queued entries and ending finished mixes.
    pub fn update(&mut self, delta: f32) {
        let delta = delta * self.time_scale;
        for track_index in 0..self.tracks.len() {
            let Some(current_id) = self.tracks[track_index] else {
                continue;
            };
            let Some(current) = self.entry_mut(current_id) else {
                continue;
            };
            current.animation_last = current.next_animation_last;
            current.track_last = current.next_track_last;

            let mut current_delta = delta * current.time_scale;
            if current.delay > 0.0 {
                current.delay -= current_delta;
                if current.delay > 0.0 {
                    continue;
                }
                current_delta = -current.delay;
                current.delay = 0.0;
            }
            let next = current.next;
            let track_last = current.track_last;
            let track_end = current.track_end;
            let time_scale = current.time_scale;
            let mixing = current.mixing_from.is_some();

            if let Some(next_id) = next {
                let next_delay = self.entry(next_id).map_or(0.0, |e| e.delay);
                let next_time = track_last - next_delay;
                if next_time >= 0.0 {
                    // Start the next entry, carrying over the time past its start.
                    if let Some(next) = self.entry_mut(next_id) {
                        next.delay = 0.0;
                        if time_scale != 0.0 {
                            next.track_time += (next_time / time_scale + delta) * next.time_scale;
                        }
                    }
                    if let Some(current) = self.entry_mut(current_id) {
                        current.track_time += current_delta;
                        current.next = None;
                    }
                    self.set_current(track_index, next_id, true);
                    let mut id = next_id;
                    while let Some(from) = self.entry(id).and_then(|e| e.mixing_from) {
                        if let Some(entry) = self.entry_mut(id) {
                            entry.mix_time += delta;
                        }
                        id = from;
                    }
                    continue;
                }
            } else if track_last >= track_end && !mixing {
                self.tracks[track_index] = None;
                self.queue_end(current_id);
                self.dispose_next(current_id);
                continue;
            }

            if mixing && self.update_mixing_from(current_id, delta) {
                let from = self
                    .entry_mut(current_id)
                    .and_then(|current| current.mixing_from.take());
                if let Some(entry) = from.and_then(|id| self.entry_mut(id)) {
                    entry.mixing_to = None;
                }
                let mut from = from;
                while let Some(id) = from {
                    self.queue_end(id);
                    from = self.entry(id).and_then(|e| e.mixing_from);
                }
            }
            if let Some(current) = self.entry_mut(current_id) {
                current.track_time += current_delta;
            }
        }
        self.drain();
    }

    /// Returns true when every mixing-out entry below `to` has finished.
    fn update_mixing_from(&mut self, to_id: EntryId, delta: f32) -> bool {
        let Some(from_id) = self.entry(to_id).and_then(|e| e.mixing_from) else {
            return true;
        };
        let finished = self.update_mixing_from(from_id, delta);

        let Some(from) = self.entry_mut(from_id) else {
            return finished;
        };
        from.animation_last = from.next_animation_last;
        from.track_last = from.next_track_last;
        let from_total_alpha = from.total_alpha;
        let from_mixing_from = from.mixing_from;
        let from_interrupt_alpha = from.interrupt_alpha;

        let Some(to) = self.entry_mut(to_id) else {
            return finished;
        };
        // A positive mix time means the from entry was applied at least once.
        if to.mix_time > 0.0 && to.mix_time >= to.mix_duration {
            // Wait for the from entry to reach zero alpha unless the mix is a single frame.
            if from_total_alpha == 0.0 || to.mix_duration == 0.0 {
                to.mixing_from = from_mixing_from;
                to.interrupt_alpha = from_interrupt_alpha;
                if let Some(entry) = from_mixing_from.and_then(|id| self.entry_mut(id)) {
                    entry.mixing_to = Some(to_id);
                }
                self.queue_end(from_id);
            }
            return finished;
        }

        to.mix_time += delta;
        if let Some(from) = self.entry_mut(from_id) {
            from.track_time += delta * from.time_scale;
        }
        false
    }

    /// Poses the skeleton from every track. Returns false when no track had an entry to apply.
    pub fn apply(&mut self, skeleton: &mut Skeleton) -> bool {
        let skeleton_data = Arc::clone(&self.data.skeleton_data);
        if self.animations_changed {
            self.animations_changed(&skeleton_data);
        }

        let mut applied = false;
        for track_index in 0..self.tracks.len() {
            let Some(current_id) = self.tracks[track_index] else {
                continue;
            };
            let Some(current) = self.entry(current_id) else {
                continue;
            };
            if current.delay > 0.0 {
                continue;
            }
            applied = true;

            let blend = if track_index == 0 {
                MixBlend::First
            } else {
                current.mix_blend
            };
            let mut mix = current.alpha;
            if current.mixing_from.is_some() {
                mix *= self.apply_mixing_from(current_id, skeleton, blend, &skeleton_data);
            } else if current.track_time >= current.track_end && current.next.is_none() {
                mix = 0.0;
            }

            let Some(current) = self.entry_mut(current_id) else {
                continue;
            };
            let animation = animation_of(&skeleton_data, current.animation_index);
            let animation_last = current.animation_last;
            let animation_time = current.animation_time();
            let timelines = animation.timelines();
            let timeline_mode = std::mem::take(&mut current.timeline_mode);
            let mut rotation = std::mem::take(&mut current.timelines_rotation);
            let mut events = std::mem::take(&mut self.events);

            if (track_index == 0 && mix == 1.0) || blend == MixBlend::Add {
                for timeline in timelines {
                    if let Timeline::Attachment(timeline) = timeline {
                        self.apply_attachment_timeline(timeline, skeleton, animation_time, blend, true);
                    } else {
                        timeline.apply(
                            skeleton,
                            animation_last,
                            animation_time,
                            Some(&mut events),
                            mix,
                            blend,
                            MixDirection::In,
                        );
                    }
                }
            } else {
                let first_frame = rotation.is_empty();
                if first_frame {
                    rotation.resize(timelines.len() * 2, 0.0);
                }

                for (i, timeline) in timelines.iter().enumerate() {
                    let timeline_blend = match timeline_mode.get(i) {
                        Some(TimelineMode::Subsequent) => blend,
                        _ => MixBlend::Setup,
                    };
                    match timeline {
                        Timeline::Rotate(timeline) => apply_rotate_timeline(
                            timeline,
                            skeleton,
                            animation_time,
                            mix,
                            timeline_blend,
                            &mut rotation,
                            i << 1,
                            first_frame,
                        ),
                        Timeline::Attachment(timeline) => self.apply_attachment_timeline(
                            timeline,
                            skeleton,
                            animation_time,
                            blend,
                            true,
                        ),
                        _ => timeline.apply(
                            skeleton,
                            animation_last,
                            animation_time,
                            Some(&mut events),
                            mix,
                            timeline_blend,
                            MixDirection::In,
                        ),
                    }
                }
            }

            self.queue_events(current_id, animation_time, &events);
            events.clear();
            self.events = events;
            if let Some(current) = self.entry_mut(current_id) {
                current.timeline_mode = timeline_mode;
                current.timelines_rotation = rotation;
                current.next_animation_last = animation_time;
                current.next_track_last = current.track_time;
            }
        }

        // Slots keyed only by mixing-out or not-yet-keyed timelines go back to setup.
        let setup_state = self.unkeyed_state + ATTACHMENT_SETUP;
        for slot_index in 0..skeleton.slots.len() {
            if skeleton.slots[slot_index].attachment_state == setup_state {
                let name = skeleton_data.slots[slot_index].attachment.as_deref();
                skeleton.set_slot_attachment(slot_index, name);
            }
        }
        self.unkeyed_state = self.unkeyed_state.wrapping_add(2);

        self.drain();
        applied
    }

    /// Applies the entries `to` is mixing out of, deepest first. Returns the mix percent of `to`.
    fn apply_mixing_from(
        &mut self,
        to_id: EntryId,
        skeleton: &mut Skeleton,
        mut blend: MixBlend,
        data: &SkeletonData,
    ) -> f32 {
        let Some(to) = self.entry(to_id) else {
            return 1.0;
        };
        let Some(from_id) = to.mixing_from else {
            return 1.0;
        };
        let (to_mix_time, to_mix_duration, to_interrupt_alpha) =
            (to.mix_time, to.mix_duration, to.interrupt_alpha);
        if self.entry(from_id).is_some_and(|from| from.mixing_from.is_some()) {
            self.apply_mixing_from(from_id, skeleton, blend, data);
        }

        let Some(from) = self.entry_mut(from_id) else {
            return 1.0;
        };
        let mix = if to_mix_duration == 0.0 {
            // Single frame mix to undo the from entry's changes.
            if blend == MixBlend::First {
                blend = MixBlend::Setup;
            }
            1.0
        } else {
            if blend != MixBlend::First {
                blend = from.mix_blend;
            }
            (to_mix_time / to_mix_duration).min(1.0)
        };

        let fire_events = mix < from.event_threshold;
        let attachments = mix < from.attachment_threshold;
        let draw_order = mix < from.draw_order_threshold;
        let animation_last = from.animation_last;
        let animation_time = from.animation_time();
        let animation = animation_of(data, from.animation_index);
        let timelines = animation.timelines();
        let alpha_hold = from.alpha * to_interrupt_alpha;
        let alpha_mix = alpha_hold * (1.0 - mix);
        let timeline_mode = std::mem::take(&mut from.timeline_mode);
        let timeline_hold_mix = std::mem::take(&mut from.timeline_hold_mix);
        let mut rotation = std::mem::take(&mut from.timelines_rotation);
        let mut events = std::mem::take(&mut self.events);
        let mut total_alpha = None;

        if blend == MixBlend::Add {
            for timeline in timelines {
                timeline.apply(
                    skeleton,
                    animation_last,
                    animation_time,
                    fire_events.then_some(&mut events),
                    alpha_mix,
                    blend,
                    MixDirection::Out,
                );
            }
        } else {
            let first_frame = rotation.is_empty();
            if first_frame {
                rotation.resize(timelines.len() * 2, 0.0);
            }

            let mut alpha_sum = 0.0;
            for (i, timeline) in timelines.iter().enumerate() {
                let is_draw_order = matches!(timeline, Timeline::DrawOrder(_));
                let mode = timeline_mode.get(i).copied().unwrap_or(TimelineMode::First);
                let (timeline_blend, alpha) = match mode {
                    TimelineMode::Subsequent => {
                        if !draw_order && is_draw_order {
                            continue;
                        }
                        (blend, alpha_mix)
                    }
                    TimelineMode::First => (MixBlend::Setup, alpha_mix),
                    TimelineMode::HoldSubsequent => (blend, alpha_hold),
                    TimelineMode::HoldFirst => (MixBlend::Setup, alpha_hold),
                    TimelineMode::HoldMix => {
                        let hold = timeline_hold_mix
                            .get(i)
                            .copied()
                            .flatten()
                            .and_then(|id| self.entry(id));
                        let alpha = match hold {
                            Some(hold) => {
                                alpha_hold * (1.0 - hold.mix_time / hold.mix_duration).max(0.0)
                            }
                            None => alpha_hold,
                        };
                        (MixBlend::Setup, alpha)
                    }
                };
                alpha_sum += alpha;

                match timeline {
                    Timeline::Rotate(timeline) => apply_rotate_timeline(
                        timeline,
                        skeleton,
                        animation_time,
                        alpha,
                        timeline_blend,
                        &mut rotation,
                        i << 1,
                        first_frame,
                    ),
                    Timeline::Attachment(timeline) => self.apply_attachment_timeline(
                        timeline,
                        skeleton,
                        animation_time,
                        timeline_blend,
                        attachments,
                    ),
                    _ => {
                        let direction =
                            if draw_order && is_draw_order && timeline_blend == MixBlend::Setup {
                                MixDirection::In
                            } else {
                                MixDirection::Out
                            };
                        timeline.apply(
                            skeleton,
                            animation_last,
                            animation_time,
                            fire_events.then_some(&mut events),
                            alpha,
                            timeline_blend,
                            direction,
                        );
                    }
                }
            }
            total_alpha = Some(alpha_sum);
        }

        if to_mix_duration > 0.0 {
            self.queue_events(from_id, animation_time, &events);
        }
        events.clear();
        self.events = events;
        if let Some(from) = self.entry_mut(from_id) {
            from.timeline_mode = timeline_mode;
            from.timeline_hold_mix = timeline_hold_mix;
            from.timelines_rotation = rotation;
            if let Some(total_alpha) = total_alpha {
                from.total_alpha = total_alpha;
            }
            from.next_animation_last = animation_time;
            from.next_track_last = from.track_time;
        }
        mix
    }

    /// Attachment keys go through the skeleton directly so slots keyed this frame can be told
    /// apart from slots that should fall back to their setup attachment.
    fn apply_attachment_timeline(
        &self,
        timeline: &AttachmentTimeline,
        skeleton: &mut Skeleton,
        time: f32,
        blend: MixBlend,
        attachments: bool,
    ) {
        let slot_index = timeline.slot_index;
        if timeline.frames.is_empty() || !skeleton.bones[skeleton.slots[slot_index].bone].active {
            return;
        }
        if time < timeline.frames[0] {
            if matches!(blend, MixBlend::Setup | MixBlend::First) {
                let data = Arc::clone(&skeleton.data);
                let setup = data.slots[slot_index].attachment.as_deref();
                self.set_attachment(skeleton, slot_index, setup, attachments);
            }
        } else {
            let frame = discrete_frame(&timeline.frames, time);
            let name = timeline.attachment_names[frame].as_deref();
            self.set_attachment(skeleton, slot_index, name, attachments);
        }

        let slot = &mut skeleton.slots[slot_index];
        if slot.attachment_state <= self.unkeyed_state {
            slot.attachment_state = self.unkeyed_state + ATTACHMENT_SETUP;
        }
    }

    fn set_attachment(
        &self,
        skeleton: &mut Skeleton,
        slot_index: usize,
        name: Option<&str>,
        attachments: bool,
    ) {
        skeleton.set_slot_attachment(slot_index, name);
        if attachments {
            skeleton.slots[slot_index].attachment_state = self.unkeyed_state + ATTACHMENT_CURRENT;
        }
    }

    /// Queues the events collected for an entry this frame, with `Complete` placed between the
    /// events before and after a loop boundary.
    fn queue_events(&mut self, entry_id: EntryId, animation_time: f32, events: &[Event]) {
        let Some(entry) = self.entry(entry_id) else {
            return;
        };
        let animation_start = entry.animation_start;
        let animation_end = entry.animation_end;
        let duration = animation_end - animation_start;
        let track_last_wrapped = entry.track_last % duration;
        let complete = if entry.looped {
            duration == 0.0 || track_last_wrapped > entry.track_time % duration
        } else {
            animation_time >= animation_end && entry.animation_last < animation_end
        };

        let mut i = 0;
        while i < events.len() {
            let event = &events[i];
            if event.time < track_last_wrapped {
                break;
            }
            if event.time <= animation_end {
                self.push(entry_id, AnimationStateEvent::Event(event.clone()));
            }
            i += 1;
        }
        if complete {
            self.push(entry_id, AnimationStateEvent::Complete);
        }
        for event in &events[i..] {
            if event.time >= animation_start {
                self.push(entry_id, AnimationStateEvent::Event(event.clone()));
            }
        }
    }

    /// Plays an animation now, replacing the track's current entry and discarding queued ones.
    /// The previous entry is mixed out unless it was never applied.
    pub fn set_animation(
        &mut self,
        track_index: usize,
        animation_name: &str,
        looped: bool,
    ) -> Result<TrackEntryHandle, Error> {
        let index = self.find_animation(animation_name)?;
        Ok(self.set_animation_index(track_index, Some(index), looped))
    }

    /// Queues an animation after the last entry on a track. A `delay` <= 0 is relative to the
    /// end of the previous entry, minus the mix duration.
    pub fn add_animation(
        &mut self,
        track_index: usize,
        animation_name: &str,
        looped: bool,
        delay: f32,
    ) -> Result<TrackEntryHandle, Error> {
        let index = self.find_animation(animation_name)?;
        Ok(self.add_animation_index(track_index, Some(index), looped, delay))
    }

    /// Mixes the track's current entry out to the setup pose over `mix_duration`.
    pub fn set_empty_animation(
        &mut self,
        track_index: usize,
        mix_duration: f32,
    ) -> Result<TrackEntryHandle, Error> {
        validate_mix_duration(mix_duration)?;
        let handle = self.set_animation_index(track_index, None, false);
        handle.set_mix_duration(self, mix_duration);
        handle.set_track_end(self, mix_duration);
        Ok(handle)
    }

    pub fn add_empty_animation(
        &mut self,
        track_index: usize,
        mix_duration: f32,
        mut delay: f32,
    ) -> Result<TrackEntryHandle, Error> {
        validate_mix_duration(mix_duration)?;
        if delay <= 0.0 {
            delay -= mix_duration;
        }
        let handle = self.add_animation_index(track_index, None, false, delay);
        handle.set_mix_duration(self, mix_duration);
        handle.set_track_end(self, mix_duration);
        Ok(handle)
    }

    /// Mixes every track out to the setup pose. Events are dispatched once, after all tracks.
    pub fn set_empty_animations(&mut self, mix_duration: f32) -> Result<(), Error> {
        validate_mix_duration(mix_duration)?;
        let old_drain_disabled = self.drain_disabled;
        self.drain_disabled = true;
        for track_index in 0..self.tracks.len() {
            if self.tracks[track_index].is_some() {
                self.set_empty_animation(track_index, mix_duration)?;
            }
        }
        self.drain_disabled = old_drain_disabled;
        self.drain();
        Ok(())
    }

    /// Ends the track's entries without mixing; the pose keeps whatever was last applied.
    pub fn clear_track(&mut self, track_index: usize) {
        let Some(Some(current_id)) = self.tracks.get(track_index).copied() else {
            return;
        };
        self.queue_end(current_id);
        self.dispose_next(current_id);
        let mut entry_id = current_id;
        while let Some(from) = self.entry(entry_id).and_then(|e| e.mixing_from) {
            self.queue_end(from);
            if let Some(entry) = self.entry_mut(entry_id) {
                entry.mixing_from = None;
                entry.mixing_to = None;
            }
            entry_id = from;
        }
        self.tracks[track_index] = None;
        self.drain();
    }

    pub fn clear_tracks(&mut self) {
        let old_drain_disabled = self.drain_disabled;
        self.drain_disabled = true;
        for track_index in 0..self.tracks.len() {
            self.clear_track(track_index);
        }
        self.tracks.clear();
        self.drain_disabled = old_drain_disabled;
        self.drain();
    }

    fn find_animation(&self, name: &str) -> Result<usize, Error> {
        self.data
            .skeleton_data
            .animation(name)
            .map(|(index, _)| index)
            .ok_or_else(|| Error::UnknownAnimation {
                name: name.to_string(),
            })
    }

    fn set_animation_index(
        &mut self,
        track_index: usize,
        animation_index: Option<usize>,
        looped: bool,
    ) -> TrackEntryHandle {
        let mut interrupt = true;
        let mut current = self.expand_to_index(track_index);
        if let Some(current_id) = current {
            let never_applied = self
                .entry(current_id)
                .is_some_and(|entry| entry.next_track_last == -1.0);
            if never_applied {
                // Don't mix from an entry that was never applied.
                let mixing_from = self.entry(current_id).and_then(|e| e.mixing_from);
                self.tracks[track_index] = mixing_from;
                self.push(current_id, AnimationStateEvent::Interrupt);
                self.queue_end(current_id);
                self.dispose_next(current_id);
                current = mixing_from;
                interrupt = false;
            } else {
                self.dispose_next(current_id);
            }
        }
        let entry_id = self.new_entry(track_index, animation_index, looped, current);
        self.set_current(track_index, entry_id, interrupt);
        self.drain();
        TrackEntryHandle { id: entry_id }
    }

    fn add_animation_index(
        &mut self,
        track_index: usize,
        animation_index: Option<usize>,
        looped: bool,
        mut delay: f32,
    ) -> TrackEntryHandle {
        let mut last = self.expand_to_index(track_index);
        if let Some(mut id) = last {
            while let Some(next) = self.entry(id).and_then(|e| e.next) {
                id = next;
            }
            last = Some(id);
        }

        let entry_id = self.new_entry(track_index, animation_index, looped, last);
        match last.and_then(|id| self.entry(id).map(|entry| (id, entry))) {
            None => {
                self.set_current(track_index, entry_id, true);
                self.drain();
            }
            Some((last_id, last)) => {
                if delay <= 0.0 {
                    let duration = last.animation_end - last.animation_start;
                    if duration != 0.0 {
                        if last.looped {
                            // Completion of the next loop.
                            delay += duration * (1.0 + (last.track_time / duration).trunc());
                        } else {
                            delay += duration.max(last.track_time);
                        }
                        delay -= self.data.mix_duration(last.animation_index, animation_index);
                    } else {
                        delay = last.track_time;
                    }
                }
                if let Some(last) = self.entry_mut(last_id) {
                    last.next = Some(entry_id);
                }
            }
        }
        if let Some(entry) = self.entry_mut(entry_id) {
            entry.delay = delay;
        }
        TrackEntryHandle { id: entry_id }
    }

    fn new_entry(
        &mut self,
        track_index: usize,
        animation_index: Option<usize>,
        looped: bool,
        last: Option<EntryId>,
    ) -> EntryId {
        let animation = animation_of(&self.data.skeleton_data, animation_index);
        let mut entry = TrackEntry::new(track_index, animation_index, animation);
        entry.looped = looped;
        entry.mix_duration = last
            .and_then(|id| self.entry(id))
            .map_or(0.0, |last| {
                self.data.mix_duration(last.animation_index, animation_index)
            });
        self.alloc_entry(entry)
    }

    fn set_current(&mut self, track_index: usize, current_id: EntryId, interrupt: bool) {
        let from = self.expand_to_index(track_index);
        self.tracks[track_index] = Some(current_id);

        if let Some(from_id) = from {
            if interrupt {
                self.push(from_id, AnimationStateEvent::Interrupt);
            }
            let mut interrupt_scale = 1.0;
            if let Some(from) = self.entry_mut(from_id) {
                from.mixing_to = Some(current_id);
                // Mixing out starts a fresh rotation direction.
                from.timelines_rotation.clear();
                if from.mixing_from.is_some() && from.mix_duration > 0.0 {
                    interrupt_scale = (from.mix_time / from.mix_duration).min(1.0);
                }
            }
            if let Some(current) = self.entry_mut(current_id) {
                current.mixing_from = Some(from_id);
                current.mix_time = 0.0;
                current.interrupt_alpha *= interrupt_scale;
            }
        }

        self.push(current_id, AnimationStateEvent::Start);
        self.animations_changed = true;
    }

    fn expand_to_index(&mut self, track_index: usize) -> Option<EntryId> {
        if track_index >= self.tracks.len() {
            self.tracks.resize(track_index + 1, None);
        }
        self.tracks[track_index]
    }

    fn dispose_next(&mut self, entry_id: EntryId) {
        let mut next = self.entry_mut(entry_id).and_then(|e| e.next.take());
        while let Some(id) = next {
            self.push(id, AnimationStateEvent::Dispose);
            next = self.entry(id).and_then(|e| e.next);
        }
    }

    fn animations_changed(&mut self, data: &SkeletonData) {
        self.animations_changed = false;
        self.property_ids.clear();
        for track_index in 0..self.tracks.len() {
            let Some(mut id) = self.tracks[track_index] else {
                continue;
            };
            while let Some(from) = self.entry(id).and_then(|e| e.mixing_from) {
                id = from;
            }
            let mut entry_id = Some(id);
            while let Some(id) = entry_id {
                let Some(entry) = self.entry(id) else {
                    break;
                };
                let mixing_to = entry.mixing_to;
                if mixing_to.is_none() || entry.mix_blend != MixBlend::Add {
                    self.compute_hold(id, data);
                }
                entry_id = mixing_to;
            }
        }
    }

    /// Classifies each of an entry's timelines against the entries mixing in after it.
    fn compute_hold(&mut self, entry_id: EntryId, data: &SkeletonData) {
        let Some(entry) = self.entry(entry_id) else {
            return;
        };
        let animation = animation_of(data, entry.animation_index);
        let to_id = entry.mixing_to;
        let to = to_id.and_then(|id| self.entry(id));
        let to_hold_previous = to.is_some_and(|to| to.hold_previous);
        let to_animation = to.map(|to| animation_of(data, to.animation_index));
        let to_mixing_to = to.and_then(|to| to.mixing_to);

        let timelines = animation.timelines();
        let mut timeline_mode = Vec::with_capacity(timelines.len());
        let mut timeline_hold_mix = vec![None; timelines.len()];

        if to_hold_previous {
            for timeline in timelines {
                timeline_mode.push(if self.property_ids.insert(timeline.property_id()) {
                    TimelineMode::HoldFirst
                } else {
                    TimelineMode::HoldSubsequent
                });
            }
        } else {
            for (i, timeline) in timelines.iter().enumerate() {
                let id = timeline.property_id();
                if !self.property_ids.insert(id) {
                    timeline_mode.push(TimelineMode::Subsequent);
                    continue;
                }
                let discrete = matches!(
                    timeline,
                    Timeline::Attachment(_) | Timeline::DrawOrder(_) | Timeline::Event(_)
                );
                if discrete || !to_animation.is_some_and(|to| to.has_timeline(id)) {
                    timeline_mode.push(TimelineMode::First);
                    continue;
                }

                let mut mode = TimelineMode::HoldFirst;
                let mut next_id = to_mixing_to;
                while let Some(next) = next_id.and_then(|id| self.entry(id)) {
                    if animation_of(data, next.animation_index).has_timeline(id) {
                        next_id = next.mixing_to;
                        continue;
                    }
                    if next.mix_duration > 0.0 {
                        mode = TimelineMode::HoldMix;
                        timeline_hold_mix[i] = next_id;
                    }
                    break;
                }
                timeline_mode.push(mode);
            }
        }

        if let Some(entry) = self.entry_mut(entry_id) {
            entry.timeline_mode = timeline_mode;
            entry.timeline_hold_mix = timeline_hold_mix;
        }
    }

    fn push(&mut self, entry: EntryId, event: AnimationStateEvent) {
        self.queue.push_back(QueuedEvent { entry, event });
    }

    fn queue_end(&mut self, entry: EntryId) {
        self.push(entry, AnimationStateEvent::End);
        self.animations_changed = true;
    }

    /// Dispatches queued events to the entry listener, then the state listener. `End` is always
    /// followed by `Dispose`, after which the entry is freed.
    fn drain(&mut self) {
        if self.drain_disabled {
            return;
        }
        self.drain_disabled = true;

        while let Some(QueuedEvent { entry, event }) = self.queue.pop_front() {
            self.dispatch(entry, &event);
            if event == AnimationStateEvent::End {
                self.dispatch(entry, &AnimationStateEvent::Dispose);
            }
            if matches!(event, AnimationStateEvent::End | AnimationStateEvent::Dispose) {
                if let Some(disposed) = self.entry(entry) {
                    log::trace!(
                        "track {}: disposing entry {:?}",
                        disposed.track_index,
                        animation_of(&self.data.skeleton_data, disposed.animation_index).name
                    );
                }
                self.free_entry(entry);
            }
        }

        self.drain_disabled = false;
    }

    fn dispatch(&mut self, entry_id: EntryId, event: &AnimationStateEvent) {
        let snapshot = self.snapshot(entry_id);

        let mut entry_listener = self.entry_mut(entry_id).and_then(|e| e.listener.take());
        if let Some(listener) = entry_listener.as_mut() {
            listener.on_event(self, &snapshot, event);
        }
        if let Some(listener) = entry_listener {
            if let Some(entry) = self.entry_mut(entry_id) {
                if entry.listener.is_none() {
                    entry.listener = Some(listener);
                }
            }
        }

        let mut state_listener = self.listener.take();
        if let Some(listener) = state_listener.as_mut() {
            listener.on_event(self, &snapshot, event);
        }
        if self.listener.is_none() {
            self.listener = state_listener;
        }
    }

    fn snapshot(&self, id: EntryId) -> TrackEntrySnapshot {
        let handle = TrackEntryHandle { id };
        match self.entry(id) {
            Some(entry) => TrackEntrySnapshot {
                handle,
                track_index: entry.track_index,
                animation_index: entry.animation_index,
                animation_name: animation_of(&self.data.skeleton_data, entry.animation_index)
                    .name
                    .clone(),
                track_time: entry.track_time,
            },
            None => TrackEntrySnapshot {
                handle,
                track_index: 0,
                animation_index: None,
                animation_name: "<disposed>".to_string(),
                track_time: 0.0,
            },
        }
    }

    fn alloc_entry(&mut self, entry: TrackEntry) -> EntryId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.entries[index];
            slot.entry = Some(entry);
            EntryId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.entries.len();
            self.entries.push(EntrySlot {
                generation: 0,
                entry: Some(entry),
            });
            EntryId {
                index,
                generation: 0,
            }
        }
    }

    fn entry(&self, id: EntryId) -> Option<&TrackEntry> {
        let slot = self.entries.get(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: EntryId) -> Option<&mut TrackEntry> {
        let slot = self.entries.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    fn free_entry(&mut self, id: EntryId) {
        let Some(slot) = self.entries.get_mut(id.index) else {
            return;
        };
        if slot.generation != id.generation || slot.entry.is_none() {
            return;
        }
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
    }
}

fn validate_mix_duration(mix_duration: f32) -> Result<(), Error> {
    if !mix_duration.is_finite() || mix_duration < 0.0 {
        return Err(Error::InvalidValue {
            message: format!("mix duration must be finite and >= 0, got {mix_duration}"),
        });
    }
    Ok(())
}

/// Rotation for an entry that is mixing. Keeps turning the way the mix started, even past 180
/// degrees, by tracking the accumulated rotation in `timelines_rotation[i..i + 2]`.
#[allow(clippy::too_many_arguments)]
fn apply_rotate_timeline(
    timeline: &RotateTimeline,
    skeleton: &mut Skeleton,
    time: f32,
    alpha: f32,
    blend: MixBlend,
    timelines_rotation: &mut [f32],
    i: usize,
    first_frame: bool,
) {
    if first_frame {
        timelines_rotation[i] = 0.0;
    }
    if timeline.frames.is_empty() {
        return;
    }
    if alpha == 1.0 {
        apply_rotate(timeline, skeleton, time, 1.0, blend);
        return;
    }

    let setup = skeleton.data.bones[timeline.bone_index].rotation;
    let bone = &mut skeleton.bones[timeline.bone_index];
    if !bone.active {
        return;
    }
    let frames = &timeline.frames;
    let (mut r1, r2);
    if time < frames[0] {
        match blend {
            MixBlend::Setup => {
                bone.rotation = setup;
                return;
            }
            MixBlend::First => {
                r1 = bone.rotation;
                r2 = setup;
            }
            MixBlend::Replace | MixBlend::Add => return,
        }
    } else {
        r1 = if blend == MixBlend::Setup {
            setup
        } else {
            bone.rotation
        };
        r2 = match bracket(frames, &timeline.curves, RotateTimeline::ENTRIES, time) {
            None => setup + frames[frames.len() - 1],
            Some((frame, percent)) => {
                let prev = frames[frame - 1];
                wrap_degrees(prev + wrap_degrees(frames[frame + 1] - prev) * percent + setup)
            }
        };
    }

    // Mix along the shortest route on the first frame, then keep that direction across crossings.
    let diff = wrap_degrees(r2 - r1);
    let total = if diff == 0.0 {
        timelines_rotation[i]
    } else {
        let (mut last_total, last_diff) = if first_frame {
            (0.0, diff)
        } else {
            (timelines_rotation[i], timelines_rotation[i + 1])
        };
        let current = diff > 0.0;
        let mut dir = last_total >= 0.0;
        // Detect a cross at 0 (not 180).
        if signum(last_diff) != signum(diff) && last_diff.abs() <= 90.0 {
            // A cross after a 360 rotation is a loop.
            if last_total.abs() > 180.0 {
                last_total += 360.0 * signum(last_total);
            }
            dir = current;
        }
        let mut total = diff + last_total - last_total % 360.0;
        if dir != current {
            total += 360.0 * signum(last_total);
        }
        timelines_rotation[i] = total;
        total
    };
    timelines_rotation[i + 1] = diff;
    r1 += total * alpha;
    bone.rotation = wrap_degrees(r1);
}
