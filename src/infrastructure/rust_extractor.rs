//! Rust source front-end.
//!
//! Walks a `syn` syntax tree to create AST nodes, lexes the file with
//! `proc-macro2` to create the token chain, then links the two by span.
//! Positions are char offsets, derived from `proc-macro2` line/column pairs.

use std::collections::{BTreeMap, HashMap};

use proc_macro2::{Delimiter, Span, TokenStream, TokenTree};
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, Ident, Item, Pat, PatType, Stmt, Type};
use tracing::debug;

use crate::domain::edge::EdgeKind;
use crate::domain::error::GraphError;
use crate::domain::graph::{FeatureGraph, SyntaxKey};
use crate::domain::line_map::LineMap;
use crate::domain::node::{NodeId, NodeKind};
use crate::infrastructure::type_table::TypeTable;
use crate::ports::{ExtractError, Extraction, FeatureExtractor, TypeDescriptor};

// Tags keep keys of different syntax types apart when an enum stores its
// payload at its own address.
const TAG_FILE: u64 = 0;
const TAG_ITEM: u64 = 1;
const TAG_STMT: u64 = 2;
const TAG_EXPR: u64 = 3;
const TAG_PAT: u64 = 4;
const TAG_TYPE: u64 = 5;
const TAG_ATTR: u64 = 6;

const KEYWORDS: &[&str] = &[
    "_", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SynFeatureExtractor {
    /// Prune leaf AST nodes after extraction
    pub prune: bool,
}

impl SynFeatureExtractor {
    pub fn new(prune: bool) -> Self {
        Self { prune }
    }
}

impl FeatureExtractor for SynFeatureExtractor {
    fn extract(&self, file_name: &str, source: &str) -> Result<Extraction, ExtractError> {
        // syn drops a leading BOM on its own; offsets are taken after it everywhere
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let file = syn::parse_file(source).map_err(|e| {
            let start = e.span().start();
            ExtractError::Parse {
                line: start.line,
                column: start.column,
                message: e.to_string(),
            }
        })?;
        let stream: TokenStream = source
            .parse()
            .map_err(|e: proc_macro2::LexError| ExtractError::Lex(e.to_string()))?;

        let line_map = LineMap::new(source);
        let chars: Vec<char> = source.chars().collect();
        let mut graph = FeatureGraph::new(file_name, line_map.clone());

        let root = graph
            .create_node(NodeKind::AstRoot, "", 0, chars.len(), syntax_key(&file, TAG_FILE))
            .id;

        let mut walker = AstWalker {
            graph: &mut graph,
            line_map: &line_map,
            chars: &chars,
            parents: vec![root],
            pending_idents: Vec::new(),
            doc_spans: BTreeMap::new(),
            type_nodes: HashMap::new(),
            types: TypeTable::default(),
            error: None,
        };
        walker.visit_file(&file);
        let AstWalker {
            pending_idents,
            doc_spans,
            types,
            error,
            ..
        } = walker;
        if let Some(e) = error {
            return Err(e.into());
        }

        let identifiers = add_tokens(&mut graph, &line_map, stream, &doc_spans)?;
        for (owner, span) in pending_idents {
            if let Some(&token) = identifiers.get(&span) {
                graph.add_edge(owner, token, EdgeKind::AssociatedToken)?;
            }
        }

        if self.prune {
            graph.prune_leaf_ast_nodes();
        }
        debug!(
            file = file_name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "extracted feature graph"
        );
        Ok(Extraction { graph, types })
    }
}

fn syntax_key<T>(node: &T, tag: u64) -> SyntaxKey {
    SyntaxKey::new(((node as *const T as usize as u64) << 3) | tag)
}

fn char_span(line_map: &LineMap, span: Span) -> (usize, usize) {
    let start = span.start();
    let end = span.end();
    (
        line_map.offset_of(start.line, start.column),
        line_map.offset_of(end.line, end.column),
    )
}

struct AstWalker<'a> {
    graph: &'a mut FeatureGraph,
    line_map: &'a LineMap,
    chars: &'a [char],
    parents: Vec<NodeId>,
    // (innermost AST node, span of an identifier it owns)
    pending_idents: Vec<(NodeId, (usize, usize))>,
    // start -> end of each doc comment
    doc_spans: BTreeMap<usize, usize>,
    type_nodes: HashMap<String, NodeId>,
    types: TypeTable,
    error: Option<GraphError>,
}

impl<'a> AstWalker<'a> {
    fn enter(&mut self, key: SyntaxKey, label: &str, span: Span, walk: impl FnOnce(&mut Self)) {
        let (start, end) = char_span(self.line_map, span);
        let id = self.graph.create_node(NodeKind::AstElement, label, start, end, key).id;
        if let Some(&parent) = self.parents.last() {
            let result = self.graph.add_edge(parent, id, EdgeKind::AstChild);
            self.record(result);
        }
        self.parents.push(id);
        walk(self);
        self.parents.pop();
    }

    fn record<T>(&mut self, result: Result<T, GraphError>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    fn type_node(&mut self, name: String, start: usize, end: usize) -> NodeId {
        if let Some(&id) = self.type_nodes.get(&name) {
            return id;
        }
        let id = self.graph.create_node_detached(NodeKind::Type, name.clone(), start, end).id;
        self.type_nodes.insert(name, id);
        id
    }
}

impl<'ast, 'a> Visit<'ast> for AstWalker<'a> {
    fn visit_item(&mut self, node: &'ast Item) {
        self.enter(syntax_key(node, TAG_ITEM), item_label(node), node.span(), |w| {
            visit::visit_item(w, node)
        });
    }

    fn visit_stmt(&mut self, node: &'ast Stmt) {
        self.enter(syntax_key(node, TAG_STMT), stmt_label(node), node.span(), |w| {
            visit::visit_stmt(w, node)
        });
    }

    fn visit_expr(&mut self, node: &'ast Expr) {
        self.enter(syntax_key(node, TAG_EXPR), expr_label(node), node.span(), |w| {
            visit::visit_expr(w, node)
        });
    }

    fn visit_pat(&mut self, node: &'ast Pat) {
        self.enter(syntax_key(node, TAG_PAT), pat_label(node), node.span(), |w| {
            visit::visit_pat(w, node)
        });
    }

    fn visit_type(&mut self, node: &'ast Type) {
        self.enter(syntax_key(node, TAG_TYPE), type_label(node), node.span(), |w| {
            visit::visit_type(w, node)
        });
    }

    fn visit_ident(&mut self, ident: &'ast Ident) {
        if let Some(&owner) = self.parents.last() {
            let span = char_span(self.line_map, ident.span());
            self.pending_idents.push((owner, span));
        }
    }

    fn visit_attribute(&mut self, attr: &'ast Attribute) {
        let Some(text) = doc_text(attr) else {
            visit::visit_attribute(self, attr);
            return;
        };
        let (start, end) = char_span(self.line_map, attr.span());
        self.doc_spans.insert(start, end);
        let comment = self
            .graph
            .create_node(NodeKind::CommentJavadoc, text, start, end, syntax_key(attr, TAG_ATTR))
            .id;
        if let Some(&owner) = self.parents.last() {
            let result = self.graph.add_edge(comment, owner, EdgeKind::Comment);
            self.record(result);
        }
    }

    fn visit_pat_type(&mut self, node: &'ast PatType) {
        visit::visit_pat_type(self, node);
        let pat_key = syntax_key(&*node.pat, TAG_PAT);
        let Some(pat) = self.graph.node_for_key(pat_key).map(|n| n.id) else {
            return;
        };
        let (start, end) = char_span(self.line_map, node.ty.span());
        let name: String = self.text(start, end).split_whitespace().collect::<Vec<_>>().join(" ");
        let type_id = self.type_node(name.clone(), start, end);
        let result = self.graph.add_edge(pat, type_id, EdgeKind::HasType);
        self.record(result);
        self.types.insert(pat, TypeDescriptor::new(name));
    }
}

fn doc_text(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    match &attr.meta {
        syn::Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) => Some(s.value().trim().to_string()),
            _ => None,
        },
        _ => None,
    }
}

struct Lexeme {
    text: String,
    kind: NodeKind,
    span: Span,
}

impl Lexeme {
    fn new(text: impl Into<String>, kind: NodeKind, span: Span) -> Self {
        Self {
            text: text.into(),
            kind,
            span,
        }
    }
}

fn flatten(stream: TokenStream, out: &mut Vec<Lexeme>) {
    for tree in stream {
        match tree {
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Brace => ("{", "}"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::None => {
                        flatten(group.stream(), out);
                        continue;
                    }
                };
                out.push(Lexeme::new(open, NodeKind::Token, group.span_open()));
                flatten(group.stream(), out);
                out.push(Lexeme::new(close, NodeKind::Token, group.span_close()));
            }
            TokenTree::Ident(ident) => {
                let text = ident.to_string();
                let kind = if KEYWORDS.contains(&text.as_str()) {
                    NodeKind::Token
                } else {
                    NodeKind::IdentifierToken
                };
                out.push(Lexeme::new(text, kind, ident.span()));
            }
            TokenTree::Punct(punct) => {
                out.push(Lexeme::new(punct.as_char().to_string(), NodeKind::Token, punct.span()));
            }
            TokenTree::Literal(literal) => {
                out.push(Lexeme::new(literal.to_string(), NodeKind::Token, literal.span()));
            }
        }
    }
}

/// Add the token chain and lexical-use edges. Returns identifier tokens by span.
fn add_tokens(
    graph: &mut FeatureGraph,
    line_map: &LineMap,
    stream: TokenStream,
    doc_spans: &BTreeMap<usize, usize>,
) -> Result<HashMap<(usize, usize), NodeId>, GraphError> {
    let mut lexemes = Vec::new();
    flatten(stream, &mut lexemes);

    let mut identifiers = HashMap::new();
    let mut last_use: HashMap<String, NodeId> = HashMap::new();
    let mut previous: Option<NodeId> = None;

    for lexeme in lexemes {
        let (start, end) = char_span(line_map, lexeme.span);
        // Doc comments desugar to `#[doc = "..."]` tokens spanning the comment
        let in_doc = doc_spans
            .range(..=start)
            .next_back()
            .map_or(false, |(_, &doc_end)| end <= doc_end);
        if in_doc {
            continue;
        }

        let id = graph.create_node_detached(lexeme.kind, lexeme.text.clone(), start, end).id;
        if let Some(prev) = previous {
            graph.add_edge(prev, id, EdgeKind::NextToken)?;
        }
        previous = Some(id);

        if lexeme.kind == NodeKind::IdentifierToken {
            identifiers.insert((start, end), id);
            if let Some(&earlier) = last_use.get(&lexeme.text) {
                graph.add_edge(id, earlier, EdgeKind::LastLexicalUse)?;
            }
            last_use.insert(lexeme.text, id);
        }
    }
    Ok(identifiers)
}

#[allow(unreachable_patterns)]
fn item_label(item: &Item) -> &'static str {
    match item {
        Item::Const(_) => "ItemConst",
        Item::Enum(_) => "ItemEnum",
        Item::ExternCrate(_) => "ItemExternCrate",
        Item::Fn(_) => "ItemFn",
        Item::ForeignMod(_) => "ItemForeignMod",
        Item::Impl(_) => "ItemImpl",
        Item::Macro(_) => "ItemMacro",
        Item::Mod(_) => "ItemMod",
        Item::Static(_) => "ItemStatic",
        Item::Struct(_) => "ItemStruct",
        Item::Trait(_) => "ItemTrait",
        Item::TraitAlias(_) => "ItemTraitAlias",
        Item::Type(_) => "ItemType",
        Item::Union(_) => "ItemUnion",
        Item::Use(_) => "ItemUse",
        _ => "Item",
    }
}

#[allow(unreachable_patterns)]
fn stmt_label(stmt: &Stmt) -> &'static str {
    match stmt {
        Stmt::Local(_) => "StmtLocal",
        Stmt::Item(_) => "StmtItem",
        Stmt::Expr(_, _) => "StmtExpr",
        Stmt::Macro(_) => "StmtMacro",
        _ => "Stmt",
    }
}

#[allow(unreachable_patterns)]
fn expr_label(expr: &Expr) -> &'static str {
    match expr {
        Expr::Array(_) => "ExprArray",
        Expr::Assign(_) => "ExprAssign",
        Expr::Async(_) => "ExprAsync",
        Expr::Await(_) => "ExprAwait",
        Expr::Binary(_) => "ExprBinary",
        Expr::Block(_) => "ExprBlock",
        Expr::Break(_) => "ExprBreak",
        Expr::Call(_) => "ExprCall",
        Expr::Cast(_) => "ExprCast",
        Expr::Closure(_) => "ExprClosure",
        Expr::Continue(_) => "ExprContinue",
        Expr::Field(_) => "ExprField",
        Expr::ForLoop(_) => "ExprForLoop",
        Expr::If(_) => "ExprIf",
        Expr::Index(_) => "ExprIndex",
        Expr::Let(_) => "ExprLet",
        Expr::Lit(_) => "ExprLit",
        Expr::Loop(_) => "ExprLoop",
        Expr::Macro(_) => "ExprMacro",
        Expr::Match(_) => "ExprMatch",
        Expr::MethodCall(_) => "ExprMethodCall",
        Expr::Paren(_) => "ExprParen",
        Expr::Path(_) => "ExprPath",
        Expr::Range(_) => "ExprRange",
        Expr::Reference(_) => "ExprReference",
        Expr::Return(_) => "ExprReturn",
        Expr::Struct(_) => "ExprStruct",
        Expr::Try(_) => "ExprTry",
        Expr::Tuple(_) => "ExprTuple",
        Expr::Unary(_) => "ExprUnary",
        Expr::Unsafe(_) => "ExprUnsafe",
        Expr::While(_) => "ExprWhile",
        _ => "Expr",
    }
}

#[allow(unreachable_patterns)]
fn pat_label(pat: &Pat) -> &'static str {
    match pat {
        Pat::Ident(_) => "PatIdent",
        Pat::Lit(_) => "PatLit",
        Pat::Or(_) => "PatOr",
        Pat::Path(_) => "PatPath",
        Pat::Range(_) => "PatRange",
        Pat::Reference(_) => "PatReference",
        Pat::Rest(_) => "PatRest",
        Pat::Slice(_) => "PatSlice",
        Pat::Struct(_) => "PatStruct",
        Pat::Tuple(_) => "PatTuple",
        Pat::TupleStruct(_) => "PatTupleStruct",
        Pat::Type(_) => "PatType",
        Pat::Wild(_) => "PatWild",
        _ => "Pat",
    }
}

#[allow(unreachable_patterns)]
fn type_label(ty: &Type) -> &'static str {
    match ty {
        Type::Array(_) => "TypeArray",
        Type::BareFn(_) => "TypeBareFn",
        Type::ImplTrait(_) => "TypeImplTrait",
        Type::Infer(_) => "TypeInfer",
        Type::Never(_) => "TypeNever",
        Type::Paren(_) => "TypeParen",
        Type::Path(_) => "TypePath",
        Type::Ptr(_) => "TypePtr",
        Type::Reference(_) => "TypeReference",
        Type::Slice(_) => "TypeSlice",
        Type::TraitObject(_) => "TypeTraitObject",
        Type::Tuple(_) => "TypeTuple",
        _ => "Type",
    }
}
