//! Stack-shuffling words.
//!
//! The `std` vocabulary: words that rearrange operands without inspecting
//! them. Macro bodies lean on these heavily to route a context query to
//! several sub-computations.

use crate::value::Stack;
use crate::word::{Definition, Word, WordResult};
use crate::words::without_top;

fn run_dup(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., v] => {
            let mut next = stack.clone();
            next.push(v.clone());
            Some(Ok(next))
        }
        [] => None,
    }
}

fn run_drop(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., _] => Some(Ok(without_top(stack, 1))),
        [] => None,
    }
}

fn run_swap(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., a, b] => {
            let mut next = without_top(stack, 2);
            next.push(b.clone());
            next.push(a.clone());
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_over(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., a, _] => {
            let mut next = stack.clone();
            next.push(a.clone());
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_rot(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., a, b, c] => {
            let (a, b, c) = (a.clone(), b.clone(), c.clone());
            let mut next = without_top(stack, 3);
            next.push(b);
            next.push(c);
            next.push(a);
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_clear(_stack: &Stack) -> WordResult {
    Some(Ok(Vec::new()))
}

pub fn definitions() -> Vec<Definition> {
    vec![
        Definition::Word(Word::new(
            "dup",
            "v -- v v",
            "Duplicate the top operand.",
            &["name,sps,:eq,:dup"],
            run_dup,
        )),
        Definition::Word(Word::new(
            "drop",
            "v --",
            "Discard the top operand.",
            &["name,sps,:eq,unused,:drop"],
            run_drop,
        )),
        Definition::Word(Word::new(
            "swap",
            "a b -- b a",
            "Exchange the top two operands.",
            &["a,b,:swap"],
            run_swap,
        )),
        Definition::Word(Word::new(
            "over",
            "a b -- a b a",
            "Copy the second operand to the top.",
            &["a,b,:over"],
            run_over,
        )),
        Definition::Word(Word::new(
            "rot",
            "a b c -- b c a",
            "Rotate the third operand to the top.",
            &["a,b,c,:rot"],
            run_rot,
        )),
        Definition::Word(Word::new(
            "clear",
            "* --",
            "Discard every operand.",
            &["a,b,c,:clear"],
            run_clear,
        )),
    ]
}
