//! Wire framing for requests and replies.
//!
//! A request is a byte stream ending at the first `|`; everything after the
//! terminator is ignored. A reply is a single line of three bracketed
//! fields, `[status][payload][code]`, always newline-terminated: status `1`
//! with an empty code on success, status `0` with a message payload and a
//! taxonomy code on error.

use crate::error::{Result, TkvsError};
use crate::executor::Reply;
use std::io::Read;

/// the byte that ends every request
pub const REQUEST_TERMINATOR: u8 = b'|';

/// reads one request from `reader`, up to and excluding the terminator
///
/// # Errors
/// an IO error if the stream fails or ends before a `|` arrives, and a
/// parsing error if the request bytes are not UTF-8
pub fn read_request<R: Read>(reader: &mut R) -> Result<String> {
    let mut request = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = reader.read(&mut byte)?;
        if n == 0 {
            return Err(TkvsError::Parsing(
                "connection closed before the request terminator".to_string(),
            ));
        }
        if byte[0] == REQUEST_TERMINATOR {
            break;
        }
        request.push(byte[0]);
    }
    String::from_utf8(request)
        .map_err(|_| TkvsError::Parsing("request is not valid UTF-8".to_string()))
}

/// renders an execution outcome into its reply line
pub fn frame_reply(outcome: &Result<Reply>) -> String {
    match outcome {
        Ok(reply) => format!("[1][{}][]\n", reply.render()),
        Err(err) => format!("[0][{}][{}]\n", err, err.code().as_str()),
    }
}
