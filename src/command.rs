//! The command tree: a two-level, case-sensitive keyword dispatch that turns
//! the tokens of one statement into a typed [`Op`].
//!
//! Level one picks the category (`CREATE`, `STR`, `SET`, `HASH`, `QUEUE`,
//! `DEL`, `KEYS`), level two the operation. Each leaf checks a minimum
//! argument count before building its op; surplus tokens are ignored except
//! by the variadic set-algebra commands, which consume everything remaining.

use crate::error::{Result, TkvsError};

/// A validated, fully typed command ready for execution against the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// `CREATE STR <key> <value>`
    CreateString { /** the key */ key: String, /** the value */ value: String },
    /// `CREATE SET <key>`
    CreateSet { /** the key */ key: String },
    /// `CREATE HASH <key>`
    CreateHash { /** the key */ key: String },
    /// `CREATE QUEUE <key>`
    CreateQueue { /** the key */ key: String },

    /// `STR GET <key>`
    StrGet { /** the key */ key: String },
    /// `STR EXISTS <key>`
    StrExists { /** the key */ key: String },
    /// `STR LEN <key>`
    StrLen { /** the key */ key: String },
    /// `STR SUB <key> <start> <end>`
    StrSub { /** the key */ key: String, /** the start index */ start: u32, /** the end index (exclusive) */ end: u32 },
    /// `STR APPEND <key> <value>`
    StrAppend { /** the key */ key: String, /** the value */ value: String },
    /// `STR PREPEND <key> <value>`
    StrPrepend { /** the key */ key: String, /** the value */ value: String },
    /// `STR INSERT <key> <index> <value>`
    StrInsert { /** the key */ key: String, /** the insertion index */ index: u32, /** the value */ value: String },
    /// `STR TRIM <key> <start> <end>`
    StrTrim { /** the key */ key: String, /** the start index */ start: u32, /** the end index (exclusive) */ end: u32 },
    /// `STR LTRIM <key> <count>`
    StrLtrim { /** the key */ key: String, /** the number of elements */ count: u32 },
    /// `STR RTRIM <key> <count>`
    StrRtrim { /** the key */ key: String, /** the number of elements */ count: u32 },

    /// `SET ADD <key> <value>`
    SetAdd { /** the key */ key: String, /** the value */ value: String },
    /// `SET LEN <key>`
    SetLen { /** the key */ key: String },
    /// `SET INTER <key> <key> [...]`
    SetInter { /** the keys to combine */ keys: Vec<String> },
    /// `SET DIFF <a> <b>`
    SetDiff { /** the first key */ a: String, /** the second key */ b: String },
    /// `SET UNION <key> <key> [...]`
    SetUnion { /** the keys to combine */ keys: Vec<String> },
    /// `SET CONTAINS <key> <value>`
    SetContains { /** the key */ key: String, /** the value */ value: String },
    /// `SET GETALL <key>`
    SetGetAll { /** the key */ key: String },
    /// `SET POP <key> <value>`
    SetPop { /** the key */ key: String, /** the value */ value: String },

    /// `HASH DEL <key> <field>`
    HashDel { /** the key */ key: String, /** the hash field */ field: String },
    /// `HASH EXISTS <key> <field>`
    HashExists { /** the key */ key: String, /** the hash field */ field: String },
    /// `HASH GET <key> <field>`
    HashGet { /** the key */ key: String, /** the hash field */ field: String },
    /// `HASH GETALL <key>`
    HashGetAll { /** the key */ key: String },
    /// `HASH GETKEYS <key>`
    HashGetKeys { /** the key */ key: String },
    /// `HASH SET <key> <field> <value>`
    HashSet { /** the key */ key: String, /** the hash field */ field: String, /** the value */ value: String },
    /// `HASH LEN <key>`
    HashLen { /** the key */ key: String },
    /// `HASH SEARCH <key> <query>`
    HashSearch { /** the key */ key: String, /** the search query */ query: String },

    /// `QUEUE PUSH <key> <value>`
    QueuePush { /** the key */ key: String, /** the value */ value: String },
    /// `QUEUE POP <key>`
    QueuePop { /** the key */ key: String },

    /// `DEL <key>`
    Del { /** the key */ key: String },
    /// `KEYS [<pattern>]`
    Keys { /** the key pattern */ pattern: String },
}

/// builds the [`Op`] for one statement's tokens
///
/// # Errors
/// `CMD_UNKNOWN` for an unrecognized keyword at either level, `BAD_ARG_LEN`
/// when the leaf's minimum token count is not met, `BAD_CAST` when a numeric
/// token does not parse as `u32`.
pub fn build(tokens: &[&str]) -> Result<Op> {
    let (category, rest) = tokens
        .split_first()
        .ok_or_else(|| TkvsError::cmd_unknown(""))?;
    match *category {
        "CREATE" => build_create(rest),
        "STR" => build_str(rest),
        "SET" => build_set(rest),
        "HASH" => build_hash(rest),
        "QUEUE" => build_queue(rest),
        "DEL" => {
            need(rest, 1, "DEL")?;
            Ok(Op::Del { key: rest[0].to_string() })
        }
        "KEYS" => Ok(Op::Keys {
            pattern: rest.first().unwrap_or(&"*").to_string(),
        }),
        other => Err(TkvsError::cmd_unknown(other)),
    }
}

fn build_create(tokens: &[&str]) -> Result<Op> {
    let (op, rest) = split_op(tokens, "CREATE")?;
    match op {
        "STR" => {
            need(rest, 2, "CREATE STR")?;
            Ok(Op::CreateString {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        "SET" => {
            need(rest, 1, "CREATE SET")?;
            Ok(Op::CreateSet { key: rest[0].to_string() })
        }
        "HASH" => {
            need(rest, 1, "CREATE HASH")?;
            Ok(Op::CreateHash { key: rest[0].to_string() })
        }
        "QUEUE" => {
            need(rest, 1, "CREATE QUEUE")?;
            Ok(Op::CreateQueue { key: rest[0].to_string() })
        }
        other => Err(TkvsError::cmd_unknown(other)),
    }
}

fn build_str(tokens: &[&str]) -> Result<Op> {
    let (op, rest) = split_op(tokens, "STR")?;
    match op {
        "GET" => {
            need(rest, 1, "STR GET")?;
            Ok(Op::StrGet { key: rest[0].to_string() })
        }
        "EXISTS" => {
            need(rest, 1, "STR EXISTS")?;
            Ok(Op::StrExists { key: rest[0].to_string() })
        }
        "LEN" => {
            need(rest, 1, "STR LEN")?;
            Ok(Op::StrLen { key: rest[0].to_string() })
        }
        "SUB" => {
            need(rest, 3, "STR SUB")?;
            Ok(Op::StrSub {
                key: rest[0].to_string(),
                start: number(rest[1])?,
                end: number(rest[2])?,
            })
        }
        "APPEND" => {
            need(rest, 2, "STR APPEND")?;
            Ok(Op::StrAppend {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        "PREPEND" => {
            need(rest, 2, "STR PREPEND")?;
            Ok(Op::StrPrepend {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        "INSERT" => {
            need(rest, 3, "STR INSERT")?;
            Ok(Op::StrInsert {
                key: rest[0].to_string(),
                index: number(rest[1])?,
                value: rest[2].to_string(),
            })
        }
        "TRIM" => {
            need(rest, 3, "STR TRIM")?;
            Ok(Op::StrTrim {
                key: rest[0].to_string(),
                start: number(rest[1])?,
                end: number(rest[2])?,
            })
        }
        "LTRIM" => {
            need(rest, 2, "STR LTRIM")?;
            Ok(Op::StrLtrim {
                key: rest[0].to_string(),
                count: number(rest[1])?,
            })
        }
        "RTRIM" => {
            need(rest, 2, "STR RTRIM")?;
            Ok(Op::StrRtrim {
                key: rest[0].to_string(),
                count: number(rest[1])?,
            })
        }
        other => Err(TkvsError::cmd_unknown(other)),
    }
}

fn build_set(tokens: &[&str]) -> Result<Op> {
    let (op, rest) = split_op(tokens, "SET")?;
    match op {
        "ADD" => {
            need(rest, 2, "SET ADD")?;
            Ok(Op::SetAdd {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        "LEN" => {
            need(rest, 1, "SET LEN")?;
            Ok(Op::SetLen { key: rest[0].to_string() })
        }
        "INTER" => {
            need(rest, 2, "SET INTER")?;
            Ok(Op::SetInter { keys: owned(rest) })
        }
        "DIFF" => {
            need(rest, 2, "SET DIFF")?;
            Ok(Op::SetDiff {
                a: rest[0].to_string(),
                b: rest[1].to_string(),
            })
        }
        "UNION" => {
            need(rest, 2, "SET UNION")?;
            Ok(Op::SetUnion { keys: owned(rest) })
        }
        "CONTAINS" => {
            need(rest, 2, "SET CONTAINS")?;
            Ok(Op::SetContains {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        "GETALL" => {
            need(rest, 1, "SET GETALL")?;
            Ok(Op::SetGetAll { key: rest[0].to_string() })
        }
        "POP" => {
            need(rest, 2, "SET POP")?;
            Ok(Op::SetPop {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        other => Err(TkvsError::cmd_unknown(other)),
    }
}

fn build_hash(tokens: &[&str]) -> Result<Op> {
    let (op, rest) = split_op(tokens, "HASH")?;
    match op {
        "DEL" => {
            need(rest, 2, "HASH DEL")?;
            Ok(Op::HashDel {
                key: rest[0].to_string(),
                field: rest[1].to_string(),
            })
        }
        "EXISTS" => {
            need(rest, 2, "HASH EXISTS")?;
            Ok(Op::HashExists {
                key: rest[0].to_string(),
                field: rest[1].to_string(),
            })
        }
        "GET" => {
            need(rest, 2, "HASH GET")?;
            Ok(Op::HashGet {
                key: rest[0].to_string(),
                field: rest[1].to_string(),
            })
        }
        "GETALL" => {
            need(rest, 1, "HASH GETALL")?;
            Ok(Op::HashGetAll { key: rest[0].to_string() })
        }
        "GETKEYS" => {
            need(rest, 1, "HASH GETKEYS")?;
            Ok(Op::HashGetKeys { key: rest[0].to_string() })
        }
        "SET" => {
            need(rest, 3, "HASH SET")?;
            Ok(Op::HashSet {
                key: rest[0].to_string(),
                field: rest[1].to_string(),
                value: rest[2].to_string(),
            })
        }
        "LEN" => {
            need(rest, 1, "HASH LEN")?;
            Ok(Op::HashLen { key: rest[0].to_string() })
        }
        "SEARCH" => {
            need(rest, 2, "HASH SEARCH")?;
            Ok(Op::HashSearch {
                key: rest[0].to_string(),
                query: rest[1].to_string(),
            })
        }
        other => Err(TkvsError::cmd_unknown(other)),
    }
}

fn build_queue(tokens: &[&str]) -> Result<Op> {
    let (op, rest) = split_op(tokens, "QUEUE")?;
    match op {
        "PUSH" => {
            need(rest, 2, "QUEUE PUSH")?;
            Ok(Op::QueuePush {
                key: rest[0].to_string(),
                value: rest[1].to_string(),
            })
        }
        "POP" => {
            need(rest, 1, "QUEUE POP")?;
            Ok(Op::QueuePop { key: rest[0].to_string() })
        }
        other => Err(TkvsError::cmd_unknown(other)),
    }
}

/// peels the level-two keyword off a category's tokens
fn split_op<'a>(tokens: &'a [&'a str], category: &str) -> Result<(&'a str, &'a [&'a str])> {
    tokens
        .split_first()
        .map(|(op, rest)| (*op, rest))
        .ok_or_else(|| TkvsError::bad_arg_len(category))
}

/// enforces a leaf's minimum argument count
fn need(tokens: &[&str], min: usize, command: &str) -> Result<()> {
    if tokens.len() < min {
        return Err(TkvsError::bad_arg_len(command));
    }
    Ok(())
}

/// parses a numeric token as an unsigned 32-bit integer
fn number(token: &str) -> Result<u32> {
    token.parse().map_err(|_| TkvsError::bad_cast(token))
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}
