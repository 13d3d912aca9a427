use crate::expression::{Expression, TransitionSettings};
use crate::string::{BodyType, StringMaterial};

/// What a command does once it reaches the engine.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    SetBowing(bool),
    /// Linear frequency ramp toward `target_hz` over `duration` seconds;
    /// overrides the a-rate pitch input while active.
    RampFrequency {
        target_hz: f32,
        duration: f32,
    },
    SetExpression(Expression),
    SetTransitionConfig(TransitionSettings),
    SetStringMaterial(StringMaterial),
    SetBodyType(BodyType),
}

/// A control command, optionally scheduled for a future render-clock
/// sample. Scheduled commands let independently-clocked instances change
/// state in sync without any cross-instance coupling.
#[derive(Debug, Clone, Copy)]
pub struct EngineCommand {
    pub action: Action,
    pub start_time: Option<u64>,
}

impl EngineCommand {
    /// Apply as soon as the engine drains its queue.
    pub fn now(action: Action) -> Self {
        Self {
            action,
            start_time: None,
        }
    }

    /// Apply once the render clock reaches `start_time` (in samples).
    pub fn at(action: Action, start_time: u64) -> Self {
        Self {
            action,
            start_time: Some(start_time),
        }
    }
}

/// Source of commands drained by the engine at each block boundary.
pub trait MessageReceiver: Send {
    fn pop(&mut self) -> Option<EngineCommand>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for rtrb::Consumer<EngineCommand> {
    fn pop(&mut self) -> Option<EngineCommand> {
        rtrb::Consumer::pop(self).ok()
    }
}

/// Producer half of the command queue, for the UI/network thread.
///
/// A full queue drops the command and logs it; the render thread is never
/// waited on.
#[cfg(feature = "rtrb")]
pub struct CommandSender {
    producer: rtrb::Producer<EngineCommand>,
}

#[cfg(feature = "rtrb")]
impl CommandSender {
    pub fn send(&mut self, command: EngineCommand) -> bool {
        match self.producer.push(command) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(?command, "command queue full, dropping command");
                false
            }
        }
    }
}

/// Create a bounded SPSC command queue. The consumer half goes to the
/// engine, the sender stays with the collaborator.
#[cfg(feature = "rtrb")]
pub fn command_queue(capacity: usize) -> (CommandSender, rtrb::Consumer<EngineCommand>) {
    let (producer, consumer) = rtrb::RingBuffer::new(capacity);
    (CommandSender { producer }, consumer)
}

/// Bounded, sorted list of commands waiting for their start time.
///
/// Capacity is fixed at construction; inserting into a full list drops the
/// farthest-future entry (silently - this runs on the render thread - but
/// counted for diagnostics).
pub(crate) struct PendingCommands {
    slots: Vec<(u64, EngineCommand)>,
    capacity: usize,
    dropped: u32,
}

impl PendingCommands {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn push(&mut self, command: EngineCommand) {
        let time = command.start_time.unwrap_or(0);
        if self.slots.len() >= self.capacity {
            match self.slots.last() {
                Some(&(last_time, _)) if time < last_time => {
                    self.slots.pop();
                    self.dropped += 1;
                }
                _ => {
                    self.dropped += 1;
                    return;
                }
            }
        }
        let at = self.slots.partition_point(|&(t, _)| t <= time);
        self.slots.insert(at, (time, command));
    }

    /// Remove and return the earliest command whose start time has been
    /// reached.
    pub fn pop_due(&mut self, clock: u64) -> Option<EngineCommand> {
        match self.slots.first() {
            Some(&(time, _)) if time <= clock => Some(self.slots.remove(0).1),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowing_at(time: u64) -> EngineCommand {
        EngineCommand::at(Action::SetBowing(true), time)
    }

    #[test]
    fn pending_commands_release_in_time_order() {
        let mut pending = PendingCommands::new(8);
        pending.push(bowing_at(300));
        pending.push(bowing_at(100));
        pending.push(bowing_at(200));

        assert!(pending.pop_due(50).is_none());
        let first = pending.pop_due(150).unwrap();
        assert_eq!(first.start_time, Some(100));
        assert!(pending.pop_due(150).is_none());

        // Clock jumped past both remaining entries; they drain in order.
        assert_eq!(pending.pop_due(1_000).unwrap().start_time, Some(200));
        assert_eq!(pending.pop_due(1_000).unwrap().start_time, Some(300));
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn full_list_keeps_the_soonest_commands() {
        let mut pending = PendingCommands::new(2);
        pending.push(bowing_at(500));
        pending.push(bowing_at(900));
        pending.push(bowing_at(100)); // evicts 900
        pending.push(bowing_at(950)); // dropped outright

        assert_eq!(pending.len(), 2);
        assert_eq!(pending.dropped(), 2);
        assert_eq!(pending.pop_due(u64::MAX).unwrap().start_time, Some(100));
        assert_eq!(pending.pop_due(u64::MAX).unwrap().start_time, Some(500));
    }
}
