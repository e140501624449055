// Turn simulation
//
// Two distinct operations live here:
// - `hypothetical_step` moves one snake and freezes the rest. It ignores collisions
//   and head-to-head outcomes entirely and exists for cheap local heuristics.
// - `simulate_turn` is the faithful multi-snake turn used by the search.
// The two disagree on purpose (a hypothetical step can walk into a wall or body);
// callers that need game-accurate outcomes must use `simulate_turn`.

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::GameRulesConfig;
use crate::state::{DeathCause, WorldState};
use crate::types::{Coord, Direction};

/// One chosen move per snake id
pub type MoveMap = BTreeMap<String, Direction>;

/// Advances only `snake_id` by `dir`, holding every other snake still.
///
/// Eating grows the body, restores health and removes the food; otherwise the tail
/// is dropped (which is what makes tail-slip work) and passive decay applies.
/// Returns the new state and whether the snake ate.
pub fn hypothetical_step(
    state: &WorldState,
    snake_id: &str,
    dir: Direction,
    rules: &GameRulesConfig,
) -> (WorldState, bool) {
    let mut next = state.clone();
    let Some(snake) = next.snakes.get_mut(snake_id) else {
        return (next, false);
    };

    let new_head = dir.apply(&snake.head());
    let will_eat = next.food.remove(&new_head);
    snake.body.insert(0, new_head);
    if will_eat {
        snake.health = rules.health_on_food;
    } else {
        snake.body.pop();
        snake.health = (snake.health - rules.health_loss_per_turn).max(0);
    }

    (next, will_eat)
}

struct Plan {
    new_head: Coord,
    will_eat: bool,
}

/// Applies one full game turn: every active snake moves by its entry in `moves`.
///
/// Active snakes without a move are eliminated with `NoMove`. Collisions resolve in
/// a fixed order (walls, bodies, head-to-head, then health), and every outcome is a
/// function of the input state and move map only.
pub fn simulate_turn(state: &WorldState, moves: &MoveMap, rules: &GameRulesConfig) -> WorldState {
    let mut next = state.clone();
    let mut eliminated: HashMap<&str, DeathCause> = HashMap::new();
    let mut planned: BTreeMap<&str, Plan> = BTreeMap::new();

    for snake in state.active_snakes() {
        match moves.get(&snake.id) {
            Some(dir) => {
                let new_head = dir.apply(&snake.head());
                planned.insert(
                    snake.id.as_str(),
                    Plan {
                        new_head,
                        will_eat: state.is_food(new_head),
                    },
                );
            }
            None => {
                eliminated.insert(snake.id.as_str(), DeathCause::NoMove);
            }
        }
    }

    // A snake that eats keeps its tail this turn; everyone else vacates theirs.
    // Eliminated snakes have no plan, so their bodies block minus the tail.
    let footprints: HashMap<&str, HashSet<Coord>> = state
        .snakes
        .values()
        .map(|snake| {
            let eats = planned.get(snake.id.as_str()).is_some_and(|p| p.will_eat);
            let keep = if eats {
                snake.body.len()
            } else {
                snake.body.len() - 1
            };
            (snake.id.as_str(), snake.body[..keep].iter().copied().collect())
        })
        .collect();

    for (&id, plan) in &planned {
        if !state.inside(plan.new_head) {
            eliminated.insert(id, DeathCause::Wall);
            continue;
        }
        let hits_other = footprints
            .iter()
            .any(|(&other, cells)| other != id && cells.contains(&plan.new_head));
        if hits_other {
            eliminated.insert(id, DeathCause::Body);
        } else if footprints[id].contains(&plan.new_head) {
            eliminated.insert(id, DeathCause::SelfCollision);
        }
    }

    let mut heads: HashMap<Coord, Vec<&str>> = HashMap::new();
    for (&id, plan) in &planned {
        if !eliminated.contains_key(id) {
            heads.entry(plan.new_head).or_default().push(id);
        }
    }
    for participants in heads.values().filter(|p| p.len() > 1) {
        let length_of = |id: &str| state.snakes[id].length();
        let max_len = participants.iter().map(|&id| length_of(id)).max().unwrap_or(0);
        let longest = participants
            .iter()
            .filter(|&&id| length_of(id) == max_len)
            .count();
        for &id in participants {
            if longest > 1 || length_of(id) < max_len {
                eliminated.insert(id, DeathCause::HeadToHead);
            }
        }
    }

    for (&id, plan) in &planned {
        if eliminated.contains_key(id) {
            continue;
        }
        let prior = &state.snakes[id];
        let Some(snake) = next.snakes.get_mut(id) else {
            continue;
        };

        let mut health = prior.health - rules.health_loss_per_turn;
        if state.is_hazard(plan.new_head) {
            health -= rules.hazard_damage;
        }
        if plan.will_eat {
            health = rules.health_on_food;
        }
        snake.health = health.max(0);

        snake.body.insert(0, plan.new_head);
        if plan.will_eat {
            next.food.remove(&plan.new_head);
        } else {
            snake.body.pop();
        }

        if snake.health <= 0 {
            eliminated.insert(id, DeathCause::Starvation);
        }
    }

    for (id, cause) in eliminated {
        debug!("Turn {}: {} eliminated ({})", state.turn, id, cause.as_str());
        if let Some(snake) = next.snakes.get_mut(id) {
            snake.eliminate(cause);
        }
    }

    next.turn = state.turn + 1;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Snake;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn world(snakes: Vec<Snake>, food: Vec<Coord>) -> WorldState {
        WorldState::new(7, 7, 0, "me", snakes, food, vec![], 0)
    }

    fn moves(pairs: &[(&str, Direction)]) -> MoveMap {
        pairs.iter().map(|(id, d)| (id.to_string(), *d)).collect()
    }

    #[test]
    fn test_hypothetical_step_shifts_body_and_decays_health() {
        let state = world(vec![Snake::new("me", 50, vec![c(2, 2), c(2, 1), c(2, 0)])], vec![]);
        let rules = GameRulesConfig::default();
        let (next, ate) = hypothetical_step(&state, "me", Direction::Up, &rules);
        assert!(!ate);
        assert_eq!(next.me().body, vec![c(2, 3), c(2, 2), c(2, 1)]);
        assert_eq!(next.me().health, 49);
        assert_eq!(state.me().body.len(), 3, "source state is untouched");
    }

    #[test]
    fn test_hypothetical_step_eats() {
        let state = world(vec![Snake::new("me", 20, vec![c(2, 2), c(2, 1)])], vec![c(3, 2)]);
        let (next, ate) =
            hypothetical_step(&state, "me", Direction::Right, &GameRulesConfig::default());
        assert!(ate);
        assert_eq!(next.me().body, vec![c(3, 2), c(2, 2), c(2, 1)]);
        assert_eq!(next.me().health, 100);
        assert!(next.food.is_empty());
    }

    #[test]
    fn test_equal_length_head_to_head_eliminates_both() {
        let state = world(
            vec![
                Snake::new("me", 90, vec![c(1, 3), c(0, 3), c(0, 2)]),
                Snake::new("opp", 90, vec![c(3, 3), c(4, 3), c(4, 2)]),
            ],
            vec![],
        );
        let next = simulate_turn(
            &state,
            &moves(&[("me", Direction::Right), ("opp", Direction::Left)]),
            &GameRulesConfig::default(),
        );
        for id in ["me", "opp"] {
            let snake = next.snake(id).unwrap();
            assert!(snake.eliminated);
            assert_eq!(snake.death_cause, Some(DeathCause::HeadToHead));
        }
        assert_eq!(next.turn, 1);
    }

    #[test]
    fn test_longer_snake_wins_head_to_head() {
        let state = world(
            vec![
                Snake::new("me", 90, vec![c(1, 3), c(0, 3), c(0, 2), c(0, 1)]),
                Snake::new("opp", 90, vec![c(3, 3), c(4, 3), c(4, 2)]),
            ],
            vec![],
        );
        let next = simulate_turn(
            &state,
            &moves(&[("me", Direction::Right), ("opp", Direction::Left)]),
            &GameRulesConfig::default(),
        );
        assert!(!next.me().eliminated);
        assert_eq!(next.me().head(), c(2, 3));
        let opp = next.snake("opp").unwrap();
        assert_eq!(opp.death_cause, Some(DeathCause::HeadToHead));
    }

    #[test]
    fn test_three_way_collision_with_tied_longest_kills_all() {
        let state = world(
            vec![
                Snake::new("a", 90, vec![c(2, 3), c(1, 3), c(0, 3)]),
                Snake::new("b", 90, vec![c(4, 3), c(5, 3), c(6, 3)]),
                Snake::new("me", 90, vec![c(3, 2), c(3, 1)]),
            ],
            vec![],
        );
        let next = simulate_turn(
            &state,
            &moves(&[
                ("a", Direction::Right),
                ("b", Direction::Left),
                ("me", Direction::Up),
            ]),
            &GameRulesConfig::default(),
        );
        assert!(next.snakes.values().all(|s| s.eliminated));
        assert!(next
            .snakes
            .values()
            .all(|s| s.death_cause == Some(DeathCause::HeadToHead)));
    }

    #[test]
    fn test_wall_body_and_missing_move() {
        let state = world(
            vec![
                Snake::new("me", 90, vec![c(0, 3), c(1, 3)]),
                Snake::new("opp", 90, vec![c(3, 4), c(3, 3), c(3, 2)]),
                Snake::new("idle", 90, vec![c(6, 6)]),
                Snake::new("rammer", 90, vec![c(4, 3), c(5, 3)]),
            ],
            vec![],
        );
        let next = simulate_turn(
            &state,
            &moves(&[
                ("me", Direction::Left),
                ("opp", Direction::Up),
                ("rammer", Direction::Left),
            ]),
            &GameRulesConfig::default(),
        );
        assert_eq!(next.me().death_cause, Some(DeathCause::Wall));
        assert_eq!(next.snake("idle").unwrap().death_cause, Some(DeathCause::NoMove));
        assert_eq!(next.snake("rammer").unwrap().death_cause, Some(DeathCause::Body));
        assert!(!next.snake("opp").unwrap().eliminated);
    }

    #[test]
    fn test_self_collision() {
        let state = world(
            vec![Snake::new("me", 90, vec![c(2, 2), c(2, 3), c(3, 3), c(3, 2), c(3, 1)])],
            vec![],
        );
        let next = simulate_turn(&state, &moves(&[("me", Direction::Right)]), &GameRulesConfig::default());
        assert_eq!(next.me().death_cause, Some(DeathCause::SelfCollision));
    }

    #[test]
    fn test_tail_slip_only_without_eating() {
        let body = vec![c(2, 2), c(2, 3), c(3, 3), c(3, 2)];
        let free = world(vec![Snake::new("me", 90, body.clone())], vec![]);
        let next = simulate_turn(&free, &moves(&[("me", Direction::Right)]), &GameRulesConfig::default());
        assert!(!next.me().eliminated, "tail vacates when not eating");

        let fed = world(vec![Snake::new("me", 90, body)], vec![c(3, 2)]);
        let next = simulate_turn(&fed, &moves(&[("me", Direction::Right)]), &GameRulesConfig::default());
        assert_eq!(next.me().death_cause, Some(DeathCause::SelfCollision));
    }

    #[test]
    fn test_health_hazard_food_and_starvation() {
        let mut state = WorldState::new(
            7,
            7,
            4,
            "me",
            vec![
                Snake::new("me", 20, vec![c(1, 1), c(1, 0)]),
                Snake::new("opp", 10, vec![c(5, 5), c(5, 4)]),
                Snake::new("fed", 3, vec![c(3, 5), c(3, 4)]),
            ],
            vec![c(3, 6)],
            vec![c(1, 2), c(5, 6)],
            0,
        );
        state.hazards.insert(c(3, 6));
        let next = simulate_turn(
            &state,
            &moves(&[
                ("me", Direction::Up),
                ("opp", Direction::Up),
                ("fed", Direction::Up),
            ]),
            &GameRulesConfig::default(),
        );

        assert_eq!(next.me().health, 4, "decay plus hazard damage");
        assert_eq!(next.me().body, vec![c(1, 2), c(1, 1)]);

        let opp = next.snake("opp").unwrap();
        assert_eq!(opp.health, 0);
        assert_eq!(opp.death_cause, Some(DeathCause::Starvation));

        let fed = next.snake("fed").unwrap();
        assert_eq!(fed.health, 100, "eating overrides hazard damage");
        assert_eq!(fed.body, vec![c(3, 6), c(3, 5), c(3, 4)]);
        assert!(next.food.is_empty());
        assert_eq!(next.turn, 5);
    }

    #[test]
    fn test_eliminated_snakes_keep_their_moves_out_of_play() {
        let mut dead = Snake::new("ghost", 0, vec![c(2, 4), c(2, 5)]);
        dead.eliminate(DeathCause::Starvation);
        let state = world(vec![Snake::new("me", 90, vec![c(2, 2), c(2, 1)]), dead], vec![]);
        let next = simulate_turn(&state, &moves(&[("me", Direction::Up)]), &GameRulesConfig::default());
        assert!(!next.me().eliminated);
        let ghost = next.snake("ghost").unwrap();
        assert_eq!(ghost.death_cause, Some(DeathCause::Starvation), "prior cause is preserved");
        assert_eq!(ghost.body, vec![c(2, 4), c(2, 5)]);
    }

    #[test]
    fn test_eliminated_body_still_blocks() {
        let mut ghost = Snake::new("ghost", 50, vec![c(3, 4), c(4, 4), c(5, 4)]);
        ghost.eliminate(DeathCause::HeadToHead);
        let state = world(vec![Snake::new("me", 90, vec![c(3, 3), c(3, 2), c(3, 1)]), ghost], vec![]);
        let next = simulate_turn(&state, &moves(&[("me", Direction::Up)]), &GameRulesConfig::default());
        assert_eq!(next.me().death_cause, Some(DeathCause::Body));
    }

    #[test]
    fn test_eliminated_tail_is_passable() {
        let mut ghost = Snake::new("ghost", 50, vec![c(5, 4), c(4, 4), c(3, 4)]);
        ghost.eliminate(DeathCause::Wall);
        let state = world(vec![Snake::new("me", 90, vec![c(3, 3), c(3, 2), c(3, 1)]), ghost], vec![]);
        let next = simulate_turn(&state, &moves(&[("me", Direction::Up)]), &GameRulesConfig::default());
        assert!(!next.me().eliminated);
    }
}
