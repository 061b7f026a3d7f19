//! The interactive collaborator that supplies choices and values

use std::collections::VecDeque;

/// A reply from the operator, or a cancellation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Value(T),
    Cancelled,
}

impl<T> Answer<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Answer::Value(value) => Some(value),
            Answer::Cancelled => None,
        }
    }
}

/// Blocking input requests made while collecting an operation's inputs
pub trait Operator {
    /// Pick one of `options`; returns its index
    fn select(&mut self, prompt: &str, options: &[String]) -> Answer<usize>;
    fn number(&mut self, prompt: &str) -> Answer<i32>;
    fn text(&mut self, prompt: &str) -> Answer<String>;
}

/// One queued reply for `ScriptedOperator`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Select(usize),
    Number(i32),
    Text(String),
    Cancel,
}

/// Replays a fixed list of replies; cancels once exhausted or on a mismatch
#[derive(Debug, Clone, Default)]
pub struct ScriptedOperator {
    replies: VecDeque<Reply>,
}

impl ScriptedOperator {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    fn next(&mut self, prompt: &str) -> Option<Reply> {
        let reply = self.replies.pop_front();
        if reply.is_none() {
            tracing::debug!(prompt, "no scripted reply, cancelling");
        }
        reply
    }
}

impl Operator for ScriptedOperator {
    fn select(&mut self, prompt: &str, options: &[String]) -> Answer<usize> {
        match self.next(prompt) {
            Some(Reply::Select(index)) if index < options.len() => Answer::Value(index),
            Some(Reply::Cancel) | None => Answer::Cancelled,
            Some(other) => {
                tracing::warn!(prompt, reply = ?other, "unusable reply to selection");
                Answer::Cancelled
            }
        }
    }

    fn number(&mut self, prompt: &str) -> Answer<i32> {
        match self.next(prompt) {
            Some(Reply::Number(value)) => Answer::Value(value),
            Some(Reply::Cancel) | None => Answer::Cancelled,
            Some(other) => {
                tracing::warn!(prompt, reply = ?other, "unusable reply to number entry");
                Answer::Cancelled
            }
        }
    }

    fn text(&mut self, prompt: &str) -> Answer<String> {
        match self.next(prompt) {
            Some(Reply::Text(value)) => Answer::Value(value),
            Some(Reply::Cancel) | None => Answer::Cancelled,
            Some(other) => {
                tracing::warn!(prompt, reply = ?other, "unusable reply to text entry");
                Answer::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replies() {
        let options = vec!["a".to_string(), "b".to_string()];
        let mut operator =
            ScriptedOperator::new([Reply::Select(1), Reply::Number(7), Reply::Select(5)]);
        assert_eq!(operator.select("pick", &options), Answer::Value(1));
        assert_eq!(operator.number("value"), Answer::Value(7));
        assert_eq!(operator.select("pick", &options), Answer::Cancelled);
        assert_eq!(operator.text("name"), Answer::Cancelled);
    }

    #[test]
    fn test_explicit_cancel() {
        let mut operator = ScriptedOperator::new([Reply::Cancel]);
        assert_eq!(operator.number("value"), Answer::Cancelled);
        assert_eq!(operator.remaining(), 0);
    }
}
