//! End-to-end tests: a small test language with a `logos` lexer and
//! hand-written rule procedures in the shape of generated recognizers.
//!
//! ```text
//! Model:     'model' name=ID '{' items+=Item* '}';
//! Item:      'item' name=ID ';';
//! List:      items+=Wrap*;
//! Wrap:      Inner;
//! Inner:     value=INT;
//! Literal:   value=INT;
//! A:         flag?='a';
//! Flags:     (a?='a' & b?='b');
//! Choice:    left=Keyed | right=Plain;      // decided on LA(2)
//! Keyed:     name=ID '=' value=INT;
//! Plain:     name=ID;
//! Ratio:     value=Fraction;
//! Fraction:  INT '/' INT;                    // datatype rule
//! Statement: expr=Expr ';';
//! Expr:      Primary ({Plus.left=current} '+' right=Primary)*;
//! Primary:   value=INT;
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]


use logos::Logos;
use std::sync::OnceLock;
use strata_ir::{
    AssignOp, Cardinality, Channel, ElementId, Grammar, GrammarBuilder, RuleKind, Span, TokenList,
    TokenType,
};

use crate::semantic::DynamicModel;
use crate::{
    ParseError, ParseResult, Parser, ParserConfig, Recognizer, RuleProcedure, RuleResult,
    RuleTable,
};
use crate::{SemanticId, SemanticValue, TokenSet};

// -- Token types --

pub(super) const WS: TokenType = TokenType(4);
pub(super) const ML_COMMENT: TokenType = TokenType(5);
pub(super) const SL_COMMENT: TokenType = TokenType(6);
pub(super) const INT: TokenType = TokenType(7);
pub(super) const ID: TokenType = TokenType(8);
pub(super) const STRING: TokenType = TokenType(9);
pub(super) const KW_MODEL: TokenType = TokenType(10);
pub(super) const KW_ITEM: TokenType = TokenType(11);
pub(super) const LBRACE: TokenType = TokenType(12);
pub(super) const RBRACE: TokenType = TokenType(13);
pub(super) const PLUS: TokenType = TokenType(17);
pub(super) const KW_A: TokenType = TokenType(18);
pub(super) const KW_B: TokenType = TokenType(19);
pub(super) const SEMI: TokenType = TokenType(20);
pub(super) const SLASH: TokenType = TokenType(21);
pub(super) const EQ: TokenType = TokenType(22);

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,
    #[token("/*", block_comment)]
    BlockComment,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"\^?[a-zA-Z_][a-zA-Z0-9_]*")]
    Id,
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,
    #[token("model")]
    Model,
    #[token("item")]
    Item,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("+")]
    Plus,
    #[token("a", priority = 3)]
    A,
    #[token("b", priority = 3)]
    B,
    #[token(";")]
    Semi,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
}

/// Scan a `/* ... */` comment to its terminator. Unterminated comments
/// run to the end of input and lex as an error.
fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

impl RawToken {
    fn token_type(self) -> TokenType {
        match self {
            RawToken::Whitespace => WS,
            RawToken::BlockComment => ML_COMMENT,
            RawToken::LineComment => SL_COMMENT,
            RawToken::Int => INT,
            RawToken::Id => ID,
            RawToken::String => STRING,
            RawToken::Model => KW_MODEL,
            RawToken::Item => KW_ITEM,
            RawToken::LBrace => LBRACE,
            RawToken::RBrace => RBRACE,
            RawToken::Plus => PLUS,
            RawToken::A => KW_A,
            RawToken::B => KW_B,
            RawToken::Semi => SEMI,
            RawToken::Slash => SLASH,
            RawToken::Eq => EQ,
        }
    }

    fn channel(self) -> Channel {
        match self {
            RawToken::Whitespace | RawToken::BlockComment | RawToken::LineComment => {
                Channel::Hidden
            }
            _ => Channel::Default,
        }
    }
}

/// Tokenize `source`. Unknown characters become invalid tokens.
pub(super) fn lex(source: &str) -> TokenList {
    let mut tokens = TokenList::new(source);
    let mut lexer = RawToken::lexer(source);
    while let Some(raw) = lexer.next() {
        let span = Span::try_from_range(lexer.span()).expect("test inputs are small");
        match raw {
            Ok(raw) => {
                tokens.push(raw.token_type(), raw.channel(), span);
            }
            Err(()) => {
                tokens.push_invalid(span, format!("unexpected character '{}'", lexer.slice()));
            }
        }
    }
    tokens
}

const TOKEN_NAMES: &[(TokenType, &str)] = &[
    (WS, "RULE_WS"),
    (ML_COMMENT, "RULE_ML_COMMENT"),
    (SL_COMMENT, "RULE_SL_COMMENT"),
    (INT, "RULE_INT"),
    (ID, "RULE_ID"),
    (STRING, "RULE_STRING"),
    (KW_MODEL, "'model'"),
    (KW_ITEM, "'item'"),
    (LBRACE, "'{'"),
    (RBRACE, "'}'"),
    (PLUS, "'+'"),
    (KW_A, "'a'"),
    (KW_B, "'b'"),
    (SEMI, "';'"),
    (SLASH, "'/'"),
    (EQ, "'='"),
];

// -- Grammar --

/// Grammar elements referenced by the rule procedures.
pub(super) struct Access {
    pub literal: ElementId,
    pub literal_value_int: ElementId,

    pub a: ElementId,
    pub a_flag_kw: ElementId,

    pub flags: ElementId,
    pub flags_group: ElementId,
    pub flags_a_kw: ElementId,
    pub flags_b_kw: ElementId,

    pub choice: ElementId,
    pub choice_left_call: ElementId,
    pub choice_right_call: ElementId,
    pub keyed: ElementId,
    pub keyed_name_id: ElementId,
    pub keyed_eq_kw: ElementId,
    pub keyed_value_int: ElementId,
    pub plain: ElementId,
    pub plain_name_id: ElementId,

    pub ratio: ElementId,
    pub ratio_value_call: ElementId,
    pub fraction_numerator: ElementId,
    pub fraction_slash: ElementId,
    pub fraction_denominator: ElementId,

    pub statement: ElementId,
    pub statement_expr_call: ElementId,
    pub statement_semi: ElementId,
    pub expr_primary_call: ElementId,
    pub expr_plus_action: ElementId,
    pub expr_plus_kw: ElementId,
    pub expr_right_call: ElementId,
    pub primary: ElementId,
    pub primary_value_int: ElementId,

    pub model: ElementId,
    pub model_kw: ElementId,
    pub model_name_id: ElementId,
    pub model_lbrace: ElementId,
    pub model_items_call: ElementId,
    pub model_rbrace: ElementId,
    pub item: ElementId,
    pub item_kw: ElementId,
    pub item_name_id: ElementId,
    pub item_semi: ElementId,

    pub list: ElementId,
    pub list_items_call: ElementId,
    pub wrap_inner_call: ElementId,
    pub inner: ElementId,
    pub inner_value_int: ElementId,
}

fn grammar() -> (Grammar, Access) {
    use AssignOp::{Add, Flag, Set};
    use RuleKind::{Datatype, Parser as ParserRule, Terminal};

    let mut b = GrammarBuilder::new("Test");

    let literal = b.rule("Literal", ParserRule, None);
    let value = b.assignment(literal, "value", Set);
    let literal_value_int = b.rule_call(value, "INT");

    let a = b.rule("A", ParserRule, None);
    let flag = b.assignment(a, "flag", Flag);
    let a_flag_kw = b.keyword(flag, "a");

    let flags = b.rule("Flags", ParserRule, None);
    let flags_group = b.unordered_group(flags);
    let fa = b.assignment(flags_group, "a", Flag);
    let flags_a_kw = b.keyword(fa, "a");
    let fb = b.assignment(flags_group, "b", Flag);
    let flags_b_kw = b.keyword(fb, "b");

    let choice = b.rule("Choice", ParserRule, None);
    let alts = b.alternatives(choice);
    let left = b.assignment(alts, "left", Set);
    let choice_left_call = b.rule_call(left, "Keyed");
    let right = b.assignment(alts, "right", Set);
    let choice_right_call = b.rule_call(right, "Plain");
    let keyed = b.rule("Keyed", ParserRule, None);
    let body = b.group(keyed);
    let name = b.assignment(body, "name", Set);
    let keyed_name_id = b.rule_call(name, "ID");
    let keyed_eq_kw = b.keyword(body, "=");
    let value = b.assignment(body, "value", Set);
    let keyed_value_int = b.rule_call(value, "INT");
    let plain = b.rule("Plain", ParserRule, None);
    let name = b.assignment(plain, "name", Set);
    let plain_name_id = b.rule_call(name, "ID");

    let ratio = b.rule("Ratio", ParserRule, None);
    let value = b.assignment(ratio, "value", Set);
    let ratio_value_call = b.rule_call(value, "Fraction");
    let fraction = b.rule("Fraction", Datatype, None);
    let body = b.group(fraction);
    let fraction_numerator = b.rule_call(body, "INT");
    let fraction_slash = b.keyword(body, "/");
    let fraction_denominator = b.rule_call(body, "INT");

    let statement = b.rule("Statement", ParserRule, None);
    let body = b.group(statement);
    let expr = b.assignment(body, "expr", Set);
    let statement_expr_call = b.rule_call(expr, "Expr");
    let statement_semi = b.keyword(body, ";");
    let expr = b.rule("Expr", ParserRule, None);
    let body = b.group(expr);
    let expr_primary_call = b.rule_call(body, "Primary");
    let tail = b.group(body);
    b.set_cardinality(tail, Cardinality::Many);
    let expr_plus_action = b.action(tail, "Plus", Some(("left", Set)));
    let expr_plus_kw = b.keyword(tail, "+");
    let right = b.assignment(tail, "right", Set);
    let expr_right_call = b.rule_call(right, "Primary");
    let primary = b.rule("Primary", ParserRule, None);
    let value = b.assignment(primary, "value", Set);
    let primary_value_int = b.rule_call(value, "INT");

    let model = b.rule("Model", ParserRule, None);
    let body = b.group(model);
    let model_kw = b.keyword(body, "model");
    let name = b.assignment(body, "name", Set);
    let model_name_id = b.rule_call(name, "ID");
    let model_lbrace = b.keyword(body, "{");
    let items = b.assignment(body, "items", Add);
    b.set_cardinality(items, Cardinality::Many);
    let model_items_call = b.rule_call(items, "Item");
    let model_rbrace = b.keyword(body, "}");
    let item = b.rule("Item", ParserRule, None);
    let body = b.group(item);
    let item_kw = b.keyword(body, "item");
    let name = b.assignment(body, "name", Set);
    let item_name_id = b.rule_call(name, "ID");
    let item_semi = b.keyword(body, ";");

    let list = b.rule("List", ParserRule, None);
    let items = b.assignment(list, "items", Add);
    b.set_cardinality(items, Cardinality::Many);
    let list_items_call = b.rule_call(items, "Wrap");
    let wrap = b.rule("Wrap", ParserRule, None);
    let wrap_inner_call = b.rule_call(wrap, "Inner");
    let inner = b.rule("Inner", ParserRule, None);
    let value = b.assignment(inner, "value", Set);
    let inner_value_int = b.rule_call(value, "INT");

    for terminal in ["INT", "ID", "STRING", "WS", "ML_COMMENT", "SL_COMMENT"] {
        b.rule(terminal, Terminal, None);
    }

    let access = Access {
        literal,
        literal_value_int,
        a,
        a_flag_kw,
        flags,
        flags_group,
        flags_a_kw,
        flags_b_kw,
        choice,
        choice_left_call,
        choice_right_call,
        keyed,
        keyed_name_id,
        keyed_eq_kw,
        keyed_value_int,
        plain,
        plain_name_id,
        ratio,
        ratio_value_call,
        fraction_numerator,
        fraction_slash,
        fraction_denominator,
        statement,
        statement_expr_call,
        statement_semi,
        expr_primary_call,
        expr_plus_action,
        expr_plus_kw,
        expr_right_call,
        primary,
        primary_value_int,
        model,
        model_kw,
        model_name_id,
        model_lbrace,
        model_items_call,
        model_rbrace,
        item,
        item_kw,
        item_name_id,
        item_semi,
        list,
        list_items_call,
        wrap_inner_call,
        inner,
        inner_value_int,
    };
    (b.finish(), access)
}

pub(super) struct Language {
    pub recognizer: Recognizer,
    pub access: Access,
}

/// The test language, built once.
pub(super) fn language() -> &'static Language {
    static LANGUAGE: OnceLock<Language> = OnceLock::new();
    LANGUAGE.get_or_init(|| {
        let (grammar, access) = grammar();
        let rules = RuleTable::new()
            .with_rule(&grammar, "Model", rule_model)
            .and_then(|t| t.with_rule(&grammar, "Item", rule_item))
            .and_then(|t| t.with_rule(&grammar, "Literal", rule_literal))
            .and_then(|t| t.with_rule(&grammar, "A", rule_a))
            .and_then(|t| t.with_rule(&grammar, "Flags", rule_flags))
            .and_then(|t| t.with_rule(&grammar, "Choice", rule_choice))
            .and_then(|t| t.with_rule(&grammar, "Ratio", rule_ratio))
            .and_then(|t| t.with_rule(&grammar, "Statement", rule_statement))
            .and_then(|t| t.with_rule(&grammar, "Expr", rule_expr))
            .and_then(|t| t.with_rule(&grammar, "List", rule_list))
            .expect("every test rule exists");
        let config = ParserConfig::new().with_token_type_map(TOKEN_NAMES.iter().copied());
        Language {
            recognizer: Recognizer::new(grammar, rules).with_config(config),
            access,
        }
    })
}

fn access() -> &'static Access {
    &language().access
}

/// Parse `source` from `entry` into a fresh [`DynamicModel`].
pub(super) fn parse(entry: &str, source: &str) -> (ParseResult, DynamicModel) {
    try_parse(entry, source).expect("parse completes")
}

pub(super) fn try_parse(
    entry: &str,
    source: &str,
) -> Result<(ParseResult, DynamicModel), ParseError> {
    let tokens = lex(source);
    let mut model = DynamicModel::new();
    let result = language().recognizer.parser(&tokens, &mut model).parse(entry)?;
    Ok((result, model))
}

// -- Rule procedures --

fn follow(kinds: &[TokenType]) -> TokenSet {
    TokenSet::of(kinds)
}

/// Follow set of the last element of a rule.
fn end_of_rule() -> TokenSet {
    TokenSet::of(&[TokenType::EOR])
}

/// `current`, created for `rule` on first use.
fn element(
    p: &mut Parser<'_>,
    current: &mut Option<SemanticId>,
    rule: ElementId,
) -> Result<SemanticId, ParseError> {
    if let Some(element) = *current {
        return Ok(element);
    }
    let element = p.create_model_element(rule)?;
    *current = Some(element);
    Ok(element)
}

/// Like [`element`], while the composite of a called rule is open.
fn element_for_parent(
    p: &mut Parser<'_>,
    current: &mut Option<SemanticId>,
    rule: ElementId,
) -> Result<SemanticId, ParseError> {
    if let Some(element) = *current {
        return Ok(element);
    }
    let element = p.create_model_element_for_parent(rule)?;
    *current = Some(element);
    Ok(element)
}

/// Rule skeleton: enter, run the body, recover on failure, leave.
fn rule(
    p: &mut Parser<'_>,
    body: impl FnOnce(&mut Parser<'_>, &mut Option<SemanticId>) -> Result<(), ParseError>,
) -> RuleResult {
    let mut current = None;
    p.enter_rule();
    let result = body(p, &mut current);
    p.catch_rule(result)?;
    p.leave_rule();
    Ok(current)
}

fn rule_literal(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let token = p.match_token(INT, &end_of_rule())?;
        p.new_leaf_node(token, g.literal_value_int);
        let literal = element(p, current, g.literal)?;
        let value = p.token_value(&token);
        p.set_with_last_consumed(literal, "value", value, Some("INT"))
    })
}

fn rule_a(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let token = p.match_token(KW_A, &end_of_rule())?;
        p.new_leaf_node(token, g.a_flag_kw);
        let a = element(p, current, g.a)?;
        p.set_with_last_consumed(a, "flag", SemanticValue::Bool(true), None)
    })
}

fn rule_flags(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let group = g.flags_group;
        p.unordered_groups().enter(group);
        let result = flags_members(p, current);
        p.unordered_groups().leave(group);
        result
    })
}

fn flags_members(p: &mut Parser<'_>, current: &mut Option<SemanticId>) -> Result<(), ParseError> {
    let g = access();
    let group = g.flags_group;
    loop {
        let la = p.la(1);
        let (index, keyword, feature) = if la == KW_A && p.unordered_groups().can_select(group, 0)
        {
            (0, g.flags_a_kw, "a")
        } else if la == KW_B && p.unordered_groups().can_select(group, 1) {
            (1, g.flags_b_kw, "b")
        } else {
            break;
        };
        p.unordered_groups().select(group, index);
        let token = p.match_token(la, &follow(&[KW_A, KW_B, TokenType::EOR]))?;
        p.new_leaf_node(token, keyword);
        let flags = element(p, current, g.flags)?;
        p.set_with_last_consumed(flags, feature, SemanticValue::Bool(true), None)?;
        p.unordered_groups().return_from_selection(group);
    }
    if !p.unordered_groups().can_leave(group) {
        return Err(p.unordered_group_failure(g.flags, group).into());
    }
    Ok(())
}

fn rule_choice(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let keyed = p.la(1) == ID && p.la(2) == EQ;
        if !keyed && p.la(1) != ID {
            return Err(p.no_viable_alternative(1).into());
        }
        let procedure: RuleProcedure = if keyed { rule_keyed } else { rule_plain };
        let (call, feature, name) = if keyed {
            (g.choice_left_call, "left", "Keyed")
        } else {
            (g.choice_right_call, "right", "Plain")
        };
        p.new_composite_node(call);
        p.push_follow(end_of_rule());
        let value = procedure(p)?;
        p.pop_follow();
        let choice = element_for_parent(p, current, g.choice)?;
        if let Some(value) = value {
            p.set(choice, feature, SemanticValue::Element(value), Some(name))?;
        }
        p.after_rule_call();
        Ok(())
    })
}

fn rule_keyed(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let name = p.match_token(ID, &follow(&[EQ]))?;
        p.new_leaf_node(name, g.keyed_name_id);
        let keyed = element(p, current, g.keyed)?;
        let value = p.token_value(&name);
        p.set_with_last_consumed(keyed, "name", value, Some("ID"))?;
        let eq = p.match_token(EQ, &follow(&[INT]))?;
        p.new_leaf_node(eq, g.keyed_eq_kw);
        let int = p.match_token(INT, &end_of_rule())?;
        p.new_leaf_node(int, g.keyed_value_int);
        let value = p.token_value(&int);
        p.set_with_last_consumed(keyed, "value", value, Some("INT"))
    })
}

fn rule_plain(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let name = p.match_token(ID, &end_of_rule())?;
        p.new_leaf_node(name, g.plain_name_id);
        let plain = element(p, current, g.plain)?;
        let value = p.token_value(&name);
        p.set_with_last_consumed(plain, "name", value, Some("ID"))
    })
}

fn rule_ratio(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        p.new_composite_node(g.ratio_value_call);
        p.push_follow(end_of_rule());
        rule_fraction(p)?;
        p.pop_follow();
        let ratio = element_for_parent(p, current, g.ratio)?;
        let text = p.current_text();
        p.set(ratio, "value", text, Some("Fraction"))?;
        p.after_rule_call();
        Ok(())
    })
}

/// Datatype rule: produces text, no element.
fn rule_fraction(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, _| {
        let numerator = p.match_token(INT, &follow(&[SLASH]))?;
        p.new_leaf_node(numerator, g.fraction_numerator);
        let slash = p.match_token(SLASH, &follow(&[INT]))?;
        p.new_leaf_node(slash, g.fraction_slash);
        let denominator = p.match_token(INT, &end_of_rule())?;
        p.new_leaf_node(denominator, g.fraction_denominator);
        Ok(())
    })
}

fn rule_statement(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        p.new_composite_node(g.statement_expr_call);
        p.push_follow(follow(&[SEMI]));
        let expr = rule_expr(p)?;
        p.pop_follow();
        let statement = element_for_parent(p, current, g.statement)?;
        if let Some(expr) = expr {
            p.set(statement, "expr", SemanticValue::Element(expr), Some("Expr"))?;
        }
        p.after_rule_call();
        let semi = p.match_token(SEMI, &end_of_rule())?;
        p.new_leaf_node(semi, g.statement_semi);
        Ok(())
    })
}

fn rule_expr(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        p.new_composite_node(g.expr_primary_call);
        p.push_follow(follow(&[PLUS, TokenType::EOR]));
        *current = rule_primary(p)?;
        p.pop_follow();
        p.after_rule_call();
        while p.la(1) == PLUS {
            let left = current.ok_or_else(|| p.no_viable_alternative(2))?;
            *current = Some(p.force_create_model_element_and_set(g.expr_plus_action, left)?);
            let plus = p.match_token(PLUS, &follow(&[INT]))?;
            p.new_leaf_node(plus, g.expr_plus_kw);
            p.new_composite_node(g.expr_right_call);
            p.push_follow(follow(&[PLUS, TokenType::EOR]));
            let right = rule_primary(p)?;
            p.pop_follow();
            if let (Some(plus), Some(right)) = (*current, right) {
                p.set(plus, "right", SemanticValue::Element(right), Some("Primary"))?;
            }
            p.after_rule_call();
        }
        Ok(())
    })
}

fn rule_primary(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let token = p.match_token(INT, &end_of_rule())?;
        p.new_leaf_node(token, g.primary_value_int);
        let primary = element(p, current, g.primary)?;
        let value = p.token_value(&token);
        p.set_with_last_consumed(primary, "value", value, Some("INT"))
    })
}

fn rule_model(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let kw = p.match_token(KW_MODEL, &follow(&[ID]))?;
        p.new_leaf_node(kw, g.model_kw);
        let name = p.match_token(ID, &follow(&[LBRACE]))?;
        p.new_leaf_node(name, g.model_name_id);
        let model = element(p, current, g.model)?;
        let value = p.token_value(&name);
        p.set_with_last_consumed(model, "name", value, Some("ID"))?;
        let lbrace = p.match_token(LBRACE, &follow(&[KW_ITEM, RBRACE]))?;
        p.new_leaf_node(lbrace, g.model_lbrace);
        while p.la(1) == KW_ITEM {
            p.new_composite_node(g.model_items_call);
            p.push_follow(follow(&[KW_ITEM, RBRACE]));
            let item = rule_item(p)?;
            p.pop_follow();
            let model = element_for_parent(p, current, g.model)?;
            if let Some(item) = item {
                p.add(model, "items", SemanticValue::Element(item), Some("Item"))?;
            }
            p.after_rule_call();
        }
        let rbrace = p.match_token(RBRACE, &end_of_rule())?;
        p.new_leaf_node(rbrace, g.model_rbrace);
        Ok(())
    })
}

fn rule_item(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let kw = p.match_token(KW_ITEM, &follow(&[ID]))?;
        p.new_leaf_node(kw, g.item_kw);
        let name = p.match_token(ID, &follow(&[SEMI]))?;
        p.new_leaf_node(name, g.item_name_id);
        let item = element(p, current, g.item)?;
        let value = p.token_value(&name);
        p.set_with_last_consumed(item, "name", value, Some("ID"))?;
        let semi = p.match_token(SEMI, &end_of_rule())?;
        p.new_leaf_node(semi, g.item_semi);
        Ok(())
    })
}

fn rule_list(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        while p.la(1) == INT {
            p.new_composite_node(g.list_items_call);
            p.push_follow(follow(&[INT, TokenType::EOR]));
            let wrapped = rule_wrap(p)?;
            p.pop_follow();
            let list = element_for_parent(p, current, g.list)?;
            if let Some(wrapped) = wrapped {
                p.add(list, "items", SemanticValue::Element(wrapped), Some("Wrap"))?;
            }
            p.after_rule_call();
        }
        Ok(())
    })
}

/// Unassigned call: the element of `Inner` becomes the element of `Wrap`.
fn rule_wrap(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        p.new_composite_node(g.wrap_inner_call);
        p.push_follow(end_of_rule());
        *current = rule_inner(p)?;
        p.pop_follow();
        p.after_rule_call();
        Ok(())
    })
}

fn rule_inner(p: &mut Parser<'_>) -> RuleResult {
    let g = access();
    rule(p, |p, current| {
        let token = p.match_token(INT, &end_of_rule())?;
        p.new_leaf_node(token, g.inner_value_int);
        let inner = element(p, current, g.inner)?;
        let value = p.token_value(&token);
        p.set_with_last_consumed(inner, "value", value, Some("INT"))
    })
}

/// Structure of a tree as comparable lines: kind, range, text and error.
pub(super) fn shape(cst: &crate::Cst) -> Vec<String> {
    cst.root()
        .descendants()
        .map(|node| {
            let kind = if node.is_leaf() { "leaf" } else { "node" };
            let error = node.syntax_error().map(ToString::to_string).unwrap_or_default();
            format!("{kind} {:?} {:?} {error}", node.span(), node.text())
        })
        .collect()
}
