use std::cell::Cell;
use std::rc::Rc;

use crate::events::{EventBus, GameEvent, SubscriptionId};

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    score: u32,
    final_score: Option<u32>,
}

/// Score keeper fed by [`GameEvent`]s.
///
/// Each `FoodEaten` adds `food_value` until a terminal event freezes the
/// final score; later events are ignored.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    tally: Rc<Cell<Tally>>,
    subscription: SubscriptionId,
}

impl Scoreboard {
    /// Subscribes a new scoreboard to `bus`.
    pub fn attach(bus: &mut EventBus, food_value: u32) -> Self {
        let tally = Rc::new(Cell::new(Tally::default()));
        let shared = Rc::clone(&tally);
        let subscription = bus.subscribe(move |event| {
            let mut current = shared.get();
            if current.final_score.is_some() {
                return;
            }
            match event {
                GameEvent::FoodEaten => current.score = current.score.saturating_add(food_value),
                GameEvent::Death | GameEvent::BoardFilled => {
                    current.final_score = Some(current.score);
                }
            }
            shared.set(current);
        });

        Self {
            tally,
            subscription,
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.tally.get().score
    }

    /// Score at the end of the game, once a terminal event was seen.
    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        self.tally.get().final_score
    }

    /// Starts counting from zero again for a new game.
    pub fn reset(&self) {
        self.tally.set(Tally::default());
    }

    /// Unsubscribes from `bus`, keeping the last values readable.
    pub fn detach(&self, bus: &mut EventBus) -> bool {
        bus.unsubscribe(self.subscription)
    }
}
