//! Runs parsed requests against the stores.
//!
//! A request is parsed into its full list of [`Op`] values before anything
//! executes, so a malformed later statement keeps the whole batch from
//! running. Execution then proceeds in order; the first failure aborts the
//! batch and the final op's reply is the batch reply.

use crate::command::{self, Op};
use crate::error::Result;
use crate::store::Stores;
use crate::tokenizer;

/// The typed result of one operation, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// a mutation with nothing to report; renders as an empty payload
    Unit,
    /// a scalar string, rendered as-is
    Str(String),
    /// a membership bit, rendered `true` / `false`
    Bool(bool),
    /// a length or count, rendered in decimal
    Uint(usize),
    /// a sequence, rendered `[ e1 e2 ]`
    List(Vec<String>),
    /// hash (field, value) pairs, rendered `[ {f1 : v1} {f2 : v2} ]`
    Pairs(Vec<(String, String)>),
}

impl Reply {
    /// renders this reply into its wire payload
    pub fn render(&self) -> String {
        match self {
            Reply::Unit => String::new(),
            Reply::Str(value) => value.clone(),
            Reply::Bool(bit) => bit.to_string(),
            Reply::Uint(count) => count.to_string(),
            Reply::List(elements) => {
                let mut out = String::from("[ ");
                for element in elements {
                    out.push_str(element);
                    out.push(' ');
                }
                out.push(']');
                out
            }
            Reply::Pairs(pairs) => {
                let mut out = String::from("[ ");
                for (field, value) in pairs {
                    out.push('{');
                    out.push_str(field);
                    out.push_str(" : ");
                    out.push_str(value);
                    out.push_str("} ");
                }
                out.push(']');
                out
            }
        }
    }
}

/// parses and executes one whole request, returning the batch reply
///
/// Whitespace-only statements are discarded. An empty batch succeeds with a
/// [`Reply::Unit`].
pub fn run_request(stores: &Stores, input: &str) -> Result<Reply> {
    let mut ops = Vec::new();
    for statement in tokenizer::statements(input) {
        if statement.trim().is_empty() {
            continue;
        }
        let tokens = tokenizer::tokens(statement);
        ops.push(command::build(&tokens)?);
    }

    let mut reply = Reply::Unit;
    for op in &ops {
        reply = run_op(stores, op)?;
    }
    Ok(reply)
}

/// executes a single op against the stores
pub fn run_op(stores: &Stores, op: &Op) -> Result<Reply> {
    match op {
        Op::CreateString { key, value } => {
            stores.strings.create(&stores.keyspace, key, value)?;
            Ok(Reply::Unit)
        }
        Op::CreateSet { key } => {
            stores.sets.create(&stores.keyspace, key)?;
            Ok(Reply::Unit)
        }
        Op::CreateHash { key } => {
            stores.hashes.create(&stores.keyspace, key)?;
            Ok(Reply::Unit)
        }
        Op::CreateQueue { key } => {
            stores.queues.create(&stores.keyspace, key)?;
            Ok(Reply::Unit)
        }

        Op::StrGet { key } => Ok(Reply::Str(stores.strings.get(key)?)),
        Op::StrExists { key } => Ok(Reply::Bool(stores.strings.exists(key))),
        Op::StrLen { key } => Ok(Reply::Uint(stores.strings.length(key)?)),
        Op::StrSub { key, start, end } => Ok(Reply::Str(stores.strings.substring(
            key,
            *start as usize,
            *end as usize,
        )?)),
        Op::StrAppend { key, value } => {
            stores.strings.append(key, value)?;
            Ok(Reply::Unit)
        }
        Op::StrPrepend { key, value } => {
            stores.strings.prepend(key, value)?;
            Ok(Reply::Unit)
        }
        Op::StrInsert { key, index, value } => {
            stores.strings.insert(key, value, *index as usize)?;
            Ok(Reply::Unit)
        }
        Op::StrTrim { key, start, end } => {
            stores.strings.trim(key, *start as usize, *end as usize)?;
            Ok(Reply::Unit)
        }
        Op::StrLtrim { key, count } => {
            stores.strings.ltrim(key, *count as usize)?;
            Ok(Reply::Unit)
        }
        Op::StrRtrim { key, count } => {
            stores.strings.rtrim(key, *count as usize)?;
            Ok(Reply::Unit)
        }

        Op::SetAdd { key, value } => {
            stores.sets.add(key, value)?;
            Ok(Reply::Unit)
        }
        Op::SetLen { key } => Ok(Reply::Uint(stores.sets.len(key)?)),
        Op::SetInter { keys } => Ok(Reply::List(stores.sets.intersection(&borrowed(keys))?)),
        Op::SetDiff { a, b } => Ok(Reply::List(stores.sets.difference(a, b)?)),
        Op::SetUnion { keys } => Ok(Reply::List(stores.sets.union(&borrowed(keys))?)),
        Op::SetContains { key, value } => Ok(Reply::Bool(stores.sets.contains(key, value)?)),
        Op::SetGetAll { key } => Ok(Reply::List(stores.sets.get_all(key)?)),
        Op::SetPop { key, value } => Ok(Reply::Str(stores.sets.pop(key, value)?)),

        Op::HashDel { key, field } => {
            stores.hashes.del(key, field)?;
            Ok(Reply::Unit)
        }
        Op::HashExists { key, field } => Ok(Reply::Bool(stores.hashes.exists(key, field)?)),
        Op::HashGet { key, field } => Ok(Reply::Str(stores.hashes.get(key, field)?)),
        Op::HashGetAll { key } => Ok(Reply::Pairs(stores.hashes.get_all(key)?)),
        Op::HashGetKeys { key } => Ok(Reply::List(stores.hashes.get_keys(key)?)),
        Op::HashSet { key, field, value } => {
            stores.hashes.set(key, field, value)?;
            Ok(Reply::Unit)
        }
        Op::HashLen { key } => Ok(Reply::Uint(stores.hashes.len(key)?)),
        Op::HashSearch { key, query } => Ok(Reply::List(stores.hashes.search(key, query)?)),

        Op::QueuePush { key, value } => {
            stores.queues.push(key, value)?;
            Ok(Reply::Unit)
        }
        Op::QueuePop { key } => Ok(Reply::Str(stores.queues.pop(key)?)),

        Op::Del { key } => {
            stores.del(key);
            Ok(Reply::Unit)
        }
        Op::Keys { pattern } => Ok(Reply::List(stores.keys(pattern))),
    }
}

fn borrowed(keys: &[String]) -> Vec<&str> {
    keys.iter().map(|k| k.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn rendering_rules() {
        assert_eq!(Reply::Unit.render(), "");
        assert_eq!(Reply::Str("hello".to_string()).render(), "hello");
        assert_eq!(Reply::Bool(true).render(), "true");
        assert_eq!(Reply::Bool(false).render(), "false");
        assert_eq!(Reply::Uint(42).render(), "42");
        assert_eq!(
            Reply::List(vec!["a".to_string(), "b".to_string()]).render(),
            "[ a b ]"
        );
        assert_eq!(Reply::List(vec![]).render(), "[ ]");
        assert_eq!(
            Reply::Pairs(vec![("k".to_string(), "v".to_string())]).render(),
            "[ {k : v} ]"
        );
        assert_eq!(Reply::Pairs(vec![]).render(), "[ ]");
    }

    #[test]
    fn last_statement_wins() {
        let stores = Stores::new();
        let reply = run_request(
            &stores,
            "CREATE STR g hello;STR APPEND g _world;STR GET g",
        )
        .unwrap();
        assert_eq!(reply.render(), "hello_world");
    }

    #[test]
    fn errors_short_circuit_the_batch() {
        let stores = Stores::new();
        let err = run_request(&stores, "CREATE STR a 1;STR GET ghost;CREATE STR b 2").unwrap_err();
        assert_eq!(err.code(), ErrorCode::KeyNotFound);
        // the failing statement stopped the batch before the third ran
        assert!(!stores.strings.exists("b"));
        assert!(stores.strings.exists("a"));
    }

    #[test]
    fn parse_errors_keep_the_whole_batch_from_running() {
        let stores = Stores::new();
        let err = run_request(&stores, "CREATE STR a 1;NONSENSE x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CmdUnknown);
        assert!(!stores.strings.exists("a"));
    }

    #[test]
    fn blank_statements_are_skipped() {
        let stores = Stores::new();
        let reply = run_request(&stores, "CREATE STR a 1; ;;STR GET a").unwrap();
        assert_eq!(reply.render(), "1");
    }

    #[test]
    fn empty_batch_is_a_unit() {
        let stores = Stores::new();
        assert_eq!(run_request(&stores, "").unwrap(), Reply::Unit);
        assert_eq!(run_request(&stores, " ; ;").unwrap(), Reply::Unit);
    }

    #[test]
    fn queue_batch_scenario() {
        let stores = Stores::new();
        let reply = run_request(
            &stores,
            "CREATE QUEUE q;QUEUE PUSH q x;QUEUE PUSH q y;QUEUE POP q;QUEUE POP q",
        )
        .unwrap();
        assert_eq!(reply.render(), "y");
    }

    #[test]
    fn keys_and_del_round_trip() {
        let stores = Stores::new();
        run_request(&stores, "CREATE STR alpha 1;CREATE SET beta").unwrap();
        assert_eq!(
            run_request(&stores, "KEYS").unwrap().render(),
            "[ alpha beta ]"
        );
        run_request(&stores, "DEL alpha").unwrap();
        assert_eq!(run_request(&stores, "KEYS *").unwrap().render(), "[ beta ]");
        // deleting a ghost is still a success
        assert_eq!(run_request(&stores, "DEL ghost").unwrap(), Reply::Unit);
    }
}
