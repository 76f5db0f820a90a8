//! Binary wire format for a compiled [`Dfa`] (spec §4.4 "Serialization"):
//! LEB128-style varints throughout, stable key ordering so two equivalent
//! machines serialize identically.
//!
//! The body is positional, as the source describes it, but the stream opens
//! with a one-byte format tag so a reader can reject anything it doesn't
//! recognize instead of misreading a positional field as something else.

use crate::dfa::{Dfa, DfaState, Transition};
use crate::error::DecodeError;
use core_events::Event;

const FORMAT_TAG: u8 = 1;

fn write_varint(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            out.push(byte | 0x80);
        } else {
            out.push(byte);
            break;
        }
    }
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let b = *bytes.get(*pos).ok_or(DecodeError::TruncatedVarint)?;
        *pos += 1;
        result |= ((b & 0x7f) as u64) << shift;
        if b & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(DecodeError::TruncatedVarint);
        }
    }
}

fn write_event(out: &mut Vec<u8>, e: Event) {
    write_varint(out, e as u64);
}

fn read_event(bytes: &[u8], pos: &mut usize) -> Result<Event, DecodeError> {
    Ok(read_varint(bytes, pos)? as i64)
}

impl Dfa {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(FORMAT_TAG);
        write_varint(&mut out, self.states.len() as u64);
        write_varint(&mut out, self.start as u64);

        let accept_entries: Vec<(usize, u32)> = self
            .states
            .iter()
            .enumerate()
            .filter_map(|(id, s)| s.accept.map(|cmd| (id, cmd)))
            .collect();
        write_varint(&mut out, accept_entries.len() as u64);
        for (id, cmd) in accept_entries {
            write_varint(&mut out, id as u64);
            write_varint(&mut out, cmd as u64);
        }

        for state in &self.states {
            write_varint(&mut out, state.transitions.len() as u64);
            for t in &state.transitions {
                write_event(&mut out, t.lo);
                write_event(&mut out, t.hi);
                write_varint(&mut out, t.to as u64);
                write_varint(&mut out, t.captures.len() as u64);
                for &(cmd_id, capture_id) in &t.captures {
                    write_varint(&mut out, cmd_id as u64);
                    write_varint(&mut out, capture_id as u64);
                }
            }
        }

        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Dfa, DecodeError> {
        let mut pos = 0usize;
        let tag = *bytes.first().ok_or(DecodeError::TruncatedVarint)?;
        if tag != FORMAT_TAG {
            return Err(DecodeError::UnknownTag(tag));
        }
        pos += 1;

        let num_states = read_varint(bytes, &mut pos)? as usize;
        let start = read_varint(bytes, &mut pos)? as usize;

        let mut states: Vec<DfaState> = (0..num_states).map(|_| DfaState::default()).collect();

        let num_accepts = read_varint(bytes, &mut pos)?;
        for _ in 0..num_accepts {
            let id = read_varint(bytes, &mut pos)? as usize;
            let cmd = read_varint(bytes, &mut pos)? as u32;
            if let Some(s) = states.get_mut(id) {
                s.accept = Some(cmd);
            }
        }

        for state in states.iter_mut() {
            let num_edges = read_varint(bytes, &mut pos)?;
            for _ in 0..num_edges {
                let lo = read_event(bytes, &mut pos)?;
                let hi = read_event(bytes, &mut pos)?;
                let to = read_varint(bytes, &mut pos)? as usize;
                let num_captures = read_varint(bytes, &mut pos)?;
                let mut captures = Vec::with_capacity(num_captures as usize);
                for _ in 0..num_captures {
                    let cmd_id = read_varint(bytes, &mut pos)? as u32;
                    let capture_id = read_varint(bytes, &mut pos)? as u32;
                    captures.push((cmd_id, capture_id));
                }
                state.transitions.push(Transition { lo, hi, to, captures });
            }
        }

        Ok(Dfa { states, start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CmdExpr, Expr};
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_a_compiled_machine() {
        let cmds = vec![
            CmdExpr::new(0, Expr::concat([Expr::event(2), Expr::event(3)])),
            CmdExpr::new(1, Expr::capture(4, Expr::range(10, 20))),
        ];
        let dfa = Dfa::compile(&cmds).unwrap();
        let bytes = dfa.to_bytes();
        let decoded = Dfa::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.start, dfa.start);
        assert_eq!(decoded.states.len(), dfa.states.len());
        for (a, b) in dfa.states.iter().zip(decoded.states.iter()) {
            assert_eq!(a.accept, b.accept);
            assert_eq!(
                a.transitions.iter().map(|t| (t.lo, t.hi, t.to, t.captures.clone())).collect::<Vec<_>>(),
                b.transitions.iter().map(|t| (t.lo, t.hi, t.to, t.captures.clone())).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn encoding_is_deterministic_across_identical_machines() {
        let cmds = vec![CmdExpr::new(0, Expr::event(7))];
        let a = Dfa::compile(&cmds).unwrap().to_bytes();
        let b = Dfa::compile(&cmds).unwrap().to_bytes();
        assert_eq!(a, b);
    }

    #[test]
    fn truncated_varint_is_rejected() {
        let bytes = vec![FORMAT_TAG, 0x80];
        assert_eq!(Dfa::from_bytes(&bytes), Err(DecodeError::TruncatedVarint));
    }

    #[test]
    fn unknown_format_tag_is_rejected() {
        let bytes = vec![0xee, 0, 0, 0];
        assert_eq!(Dfa::from_bytes(&bytes), Err(DecodeError::UnknownTag(0xee)));
    }
}
