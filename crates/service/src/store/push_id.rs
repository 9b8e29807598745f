//! Time-prefixed, lexicographically sortable record keys.

use std::sync::Mutex;

use rand::Rng;

/// Key alphabet, in ASCII order so that string order matches numeric order.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_LEN: usize = 8;
const RAND_LEN: usize = 12;
pub const PUSH_ID_LEN: usize = TIME_LEN + RAND_LEN;

#[derive(Default)]
struct State {
    last_millis: i64,
    last_rand: [u8; RAND_LEN],
}

/// Generates 20-character keys: 8 characters of millisecond timestamp followed
/// by 12 random characters. Keys from one generator are strictly increasing;
/// within one millisecond the random tail of the previous key is incremented.
#[derive(Default)]
pub struct PushIdGenerator {
    state: Mutex<State>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_millis: i64) -> String {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // a clock stepping backwards must not break ordering
        let now = now_millis.max(state.last_millis);
        let same_millis = now == state.last_millis;
        state.last_millis = now;

        if same_millis {
            for digit in state.last_rand.iter_mut().rev() {
                if *digit == 63 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    break;
                }
            }
        } else {
            let mut rng = rand::thread_rng();
            for digit in state.last_rand.iter_mut() {
                *digit = rng.gen_range(0..64);
            }
        }

        let mut id = Vec::with_capacity(PUSH_ID_LEN);
        let mut t = now;
        let mut time_chars = [0u8; TIME_LEN];
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(t % 64) as usize];
            t /= 64;
        }
        id.extend_from_slice(&time_chars);
        id.extend(state.last_rand.iter().map(|d| PUSH_CHARS[*d as usize]));
        id.into_iter().map(char::from).collect()
    }
}
