// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding vector encoding for the fixed-width BLOB column.
//!
//! Vectors are stored as little-endian f32 bytes. Width is enforced at
//! both encode and decode so a schema-width violation can never reach or
//! leave the database unnoticed.

use tidings_core::{TidingsError, EMBEDDING_DIM};

/// Encode an embedding for storage. Rejects vectors of the wrong width.
pub fn encode_embedding(vector: &[f32]) -> Result<Vec<u8>, TidingsError> {
    if vector.len() != EMBEDDING_DIM {
        return Err(TidingsError::Embedding(format!(
            "expected {EMBEDDING_DIM}-dimensional vector, got {}",
            vector.len()
        )));
    }
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(bytes)
}

/// Decode an embedding BLOB read back from the database.
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, TidingsError> {
    if bytes.len() != EMBEDDING_DIM * 4 {
        return Err(TidingsError::Embedding(format!(
            "embedding blob has {} bytes, expected {}",
            bytes.len(),
            EMBEDDING_DIM * 4
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
