//! LL(1) grammar table for the JSON value language (§4.3.2), built once by
//! [`table`] via the fixed-point closure the spec describes: direct
//! productions (RHS starting with a terminal) seed the table, then
//! productions whose RHS starts with a nonterminal inherit every lookahead
//! already known for that nonterminal, repeating until nothing changes.
//! Two productions claiming the same cell is a grammar bug, not a runtime
//! error, so it panics rather than returning a `Result`.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::token::TermKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerm {
    Val,
    Arr,
    ArrCont,
    ArrEtc,
    Map,
    MapCont,
    MapPair,
    MapEtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermRole {
    /// Matched and discarded; carries no semantic payload.
    Plain,
    /// This terminal's payload is a leaf `Value` to attach.
    ValLeaf,
    /// This terminal's payload is a pending map key.
    MapKey,
}

#[derive(Debug, Clone, Copy)]
pub enum Symbol {
    Term(TermKind, TermRole),
    NonTerm(NonTerm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    ArrStart,
    ArrEnd,
    MapStart,
    MapEnd,
}

pub struct Production {
    pub lhs: NonTerm,
    pub rhs: &'static [Symbol],
    pub action: Action,
}

use Action::*;
use NonTerm::*;
use Symbol::*;
use TermKind as T;
use TermRole::*;

pub static PRODUCTIONS: &[Production] = &[
    // 0: VAL -> ARR
    Production { lhs: Val, rhs: &[NonTerm(Arr)], action: None },
    // 1: VAL -> MAP
    Production { lhs: Val, rhs: &[NonTerm(Map)], action: None },
    // 2: VAL -> STRING
    Production { lhs: Val, rhs: &[Term(T::Str, ValLeaf)], action: None },
    // 3: VAL -> INTEGER
    Production { lhs: Val, rhs: &[Term(T::Integer, ValLeaf)], action: None },
    // 4: VAL -> REAL
    Production { lhs: Val, rhs: &[Term(T::Real, ValLeaf)], action: None },
    // 5: VAL -> TRUE
    Production { lhs: Val, rhs: &[Term(T::True, ValLeaf)], action: None },
    // 6: VAL -> FALSE
    Production { lhs: Val, rhs: &[Term(T::False, ValLeaf)], action: None },
    // 7: VAL -> NIL
    Production { lhs: Val, rhs: &[Term(T::Nil, ValLeaf)], action: None },
    // 8: ARR -> '[' ARR_CONT
    Production { lhs: Arr, rhs: &[Term(T::LeftSquare, Plain), NonTerm(ArrCont)], action: ArrStart },
    // 9: ARR_CONT -> ']'
    Production { lhs: ArrCont, rhs: &[Term(T::RightSquare, Plain)], action: ArrEnd },
    // 10: ARR_CONT -> VAL ARR_ETC
    Production { lhs: ArrCont, rhs: &[NonTerm(Val), NonTerm(ArrEtc)], action: None },
    // 11: ARR_ETC -> ']'
    Production { lhs: ArrEtc, rhs: &[Term(T::RightSquare, Plain)], action: ArrEnd },
    // 12: ARR_ETC -> ',' VAL ARR_ETC
    Production { lhs: ArrEtc, rhs: &[Term(T::Comma, Plain), NonTerm(Val), NonTerm(ArrEtc)], action: None },
    // 13: MAP -> '{' MAP_CONT
    Production { lhs: Map, rhs: &[Term(T::LeftCurly, Plain), NonTerm(MapCont)], action: MapStart },
    // 14: MAP_CONT -> '}'
    Production { lhs: MapCont, rhs: &[Term(T::RightCurly, Plain)], action: MapEnd },
    // 15: MAP_CONT -> MAP_PAIR MAP_ETC
    Production { lhs: MapCont, rhs: &[NonTerm(MapPair), NonTerm(MapEtc)], action: None },
    // 16: MAP_ETC -> '}'
    Production { lhs: MapEtc, rhs: &[Term(T::RightCurly, Plain)], action: MapEnd },
    // 17: MAP_ETC -> ',' MAP_PAIR MAP_ETC
    Production { lhs: MapEtc, rhs: &[Term(T::Comma, Plain), NonTerm(MapPair), NonTerm(MapEtc)], action: None },
    // 18: MAP_PAIR -> STRING ':' VAL
    Production { lhs: MapPair, rhs: &[Term(T::Str, MapKey), Term(T::Colon, Plain), NonTerm(Val)], action: None },
];

pub type Table = HashMap<(NonTerm, TermKind), usize>;

fn build_table() -> Table {
    let mut table: Table = HashMap::new();

    // Seed with direct productions (RHS begins with a terminal).
    for (idx, prod) in PRODUCTIONS.iter().enumerate() {
        if let Some(Term(kind, _)) = prod.rhs.first() {
            let prev = table.insert((prod.lhs, *kind), idx);
            assert!(
                prev.is_none(),
                "conflicting direct rules for ({:?}, {:?})",
                prod.lhs,
                kind
            );
        }
    }

    // Close over productions whose RHS begins with a nonterminal: they
    // inherit every lookahead already resolved for that nonterminal.
    loop {
        let mut changed = false;
        for (idx, prod) in PRODUCTIONS.iter().enumerate() {
            if let Some(NonTerm(inner)) = prod.rhs.first() {
                let inherited: Vec<TermKind> = table
                    .iter()
                    .filter(|((nt, _), _)| nt == inner)
                    .map(|((_, tk), _)| *tk)
                    .collect();
                for tk in inherited {
                    match table.get(&(prod.lhs, tk)) {
                        Some(existing) if *existing != idx => {
                            panic!(
                                "conflicting rules for ({:?}, {:?}): {} vs {}",
                                prod.lhs, tk, existing, idx
                            );
                        }
                        Some(_) => {}
                        None => {
                            table.insert((prod.lhs, tk), idx);
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    table
}

pub fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(build_table)
}
