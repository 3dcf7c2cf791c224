// ----------------------------
// File: src/back/mod.rs
// ----------------------------
//! Code generation: lowers the typed AST into x86-64 AT&T assembly.
//!
//! The emitter is a single pass with a tiny discipline: every expression
//! leaves its 64-bit result in `%rax` (floats are bit-cast across the
//! boundary), and `%rbx` holds the right operand of a binary node via
//! "push left, evaluate right, pop". The generator builds its own symbol
//! table; a pre-declaration walk assigns every local (including loop
//! variables in nested bodies) a slot before the prologue reserves one
//! 16-byte-aligned block.

use std::fmt::Write;

use crate::front::ast::*;
use crate::symtab::{Symbol, SymbolTable};
use crate::Options;

/// Integer argument registers, System V order.
const ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

pub struct CodeGenerator {
    table: SymbolTable,
    code: String,
    data: String,
    label_counter: usize,
    string_counter: usize,
    fold_constants: bool,
    eliminate_dead_branches: bool,
    /// Outstanding evaluation-stack pushes; parity decides call padding.
    pushed: usize,
}

impl CodeGenerator {
    pub fn new(options: &Options) -> Self {
        Self {
            table: SymbolTable::new(),
            code: String::new(),
            data: String::new(),
            label_counter: 0,
            string_counter: 0,
            fold_constants: options.fold_constants,
            eliminate_dead_branches: options.eliminate_dead_branches,
            pushed: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> String {
        self.code.push_str(".text\n.global main\n\n");

        for func in &program.functions {
            self.gen_function(func);
            self.code.push('\n');
        }

        // runtime support: print one signed integer through printf
        self.code.push_str("print_int:\n");
        self.code.push_str("    pushq %rbp\n");
        self.code.push_str("    movq %rsp, %rbp\n");
        self.code.push_str("    movq %rdi, %rsi\n");
        self.code.push_str("    leaq int_fmt(%rip), %rdi\n");
        self.code.push_str("    movl $0, %eax\n");
        self.code.push_str("    call printf@PLT\n");
        self.code.push_str("    leave\n");
        self.code.push_str("    ret\n\n");

        self.code.push_str(".data\n");
        self.code.push_str("int_fmt: .asciz \"%ld\\n\"\n");
        self.code.push_str(&self.data.clone());
        self.code.push_str(".section .note.GNU-stack,\"\",@progbits\n");
        self.code
    }

    // --- emission helpers ---

    fn emit(&mut self, instruction: &str) {
        let _ = writeln!(self.code, "    {instruction}");
    }

    fn emit_label(&mut self, label: &str) {
        let _ = writeln!(self.code, "{label}:");
    }

    fn emit_push(&mut self, reg: &str) {
        self.emit(&format!("pushq %{reg}"));
        self.pushed += 1;
    }

    fn emit_pop(&mut self, reg: &str) {
        self.emit(&format!("popq %{reg}"));
        self.pushed -= 1;
    }

    fn new_label(&mut self) -> String {
        let l = format!(".L{}", self.label_counter);
        self.label_counter += 1;
        l
    }

    fn new_string_label(&mut self) -> String {
        let l = format!(".STR{}", self.string_counter);
        self.string_counter += 1;
        l
    }

    fn mem(offset: i64) -> String {
        format!("{offset}(%rbp)")
    }

    // --- functions ---

    fn gen_function(&mut self, func: &FunctionDecl) {
        self.table.enter_scope();
        self.table.reset_offset();

        // register-passed parameters get local slots; extras already live
        // above the saved frame pointer
        for (i, param) in func.params.iter().enumerate() {
            let offset = if i < ARG_REGS.len() {
                self.table.allocate_stack_space(8)
            } else {
                16 + 8 * (i as i64 - ARG_REGS.len() as i64)
            };
            let _ = self.table.declare_variable(&param.name, Symbol {
                name: param.name.clone(),
                ty: param.ty,
                is_mutable: true,
                is_parameter: true,
                offset,
                array_dims: param.array_dims.clone(),
            });
        }

        self.pre_declare(&func.body);
        let stack_size = -self.table.current_offset();
        let aligned_size = (stack_size + 15) & !15;

        self.emit_label(&func.name);
        self.emit("pushq %rbp");
        self.emit("movq %rsp, %rbp");
        if aligned_size > 0 {
            self.emit(&format!("subq ${aligned_size}, %rsp"));
        }

        // spill incoming registers so every parameter is addressable
        for (i, param) in func.params.iter().take(ARG_REGS.len()).enumerate() {
            if let Some(sym) = self.table.lookup(&param.name) {
                let offset = sym.offset;
                self.emit(&format!("movq %{}, {}", ARG_REGS[i], Self::mem(offset)));
            }
        }

        self.gen_stmt(&func.body);

        if func.return_type == DataType::Void {
            self.gen_epilogue();
        }

        self.table.exit_scope();
    }

    fn gen_epilogue(&mut self) {
        self.emit("leave");
        self.emit("ret");
    }

    /// Assign a slot to every declaration in the body, nested bodies
    /// included, before any code is emitted. Idempotent: a name that
    /// already has a slot is left alone.
    fn pre_declare(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { name, ty, array_dims, .. } => {
                if self.table.lookup(name).is_none() {
                    let mut size = 8;
                    for &dim in array_dims {
                        if dim > 0 {
                            size *= dim;
                        }
                    }
                    let offset = self.table.allocate_stack_space(size);
                    let _ = self.table.declare_variable(name, Symbol {
                        name: name.clone(),
                        ty: *ty,
                        is_mutable: true,
                        is_parameter: false,
                        offset,
                        array_dims: array_dims.clone(),
                    });
                }
            }
            Stmt::Block(statements) => {
                for s in statements {
                    self.pre_declare(s);
                }
            }
            Stmt::If { then_branch, else_branch, .. } => {
                self.pre_declare(then_branch);
                if let Some(els) = else_branch {
                    self.pre_declare(els);
                }
            }
            Stmt::While { body, .. } => self.pre_declare(body),
            Stmt::For { var, body, .. } => {
                if self.table.lookup(var).is_none() {
                    let offset = self.table.allocate_stack_space(8);
                    let _ = self.table.declare_variable(var, Symbol {
                        name: var.clone(),
                        ty: DataType::Int,
                        is_mutable: true,
                        is_parameter: false,
                        offset,
                        array_dims: Vec::new(),
                    });
                }
                self.pre_declare(body);
            }
            Stmt::Assign { .. } | Stmt::Expr(_) | Stmt::Return { .. } => {}
        }
    }

    // --- statements ---

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { name, ty, initializer, .. } => {
                if let Some(init) = initializer {
                    self.gen_expr(init);
                    self.convert_type(init.ty, *ty);
                    self.store_variable(name, *ty);
                }
            }
            Stmt::Assign { target, value } => {
                self.gen_expr(value);
                self.emit_push("rax");

                match &target.kind {
                    ExprKind::ArrayAccess { array, indices } => {
                        if let ExprKind::Identifier { name } = &array.kind {
                            let sym = match self.table.lookup(name) {
                                Some(s) => s.clone(),
                                None => {
                                    self.emit_pop("rax");
                                    return;
                                }
                            };
                            self.gen_array_address(&sym, indices);
                            self.emit_pop("rax");
                            self.emit("movq %rax, (%rbx)");
                        } else {
                            self.emit_pop("rax");
                        }
                    }
                    ExprKind::Identifier { name } => {
                        self.emit_pop("rax");
                        let name = name.clone();
                        if let Some(sym) = self.table.lookup(&name) {
                            let ty = sym.ty;
                            self.store_variable(&name, ty);
                        }
                    }
                    _ => {
                        // the analyzer rejects non-lvalue targets
                        self.emit_pop("rax");
                    }
                }
            }
            Stmt::Expr(expr) => self.gen_expr(expr),
            Stmt::If { condition, then_branch, else_branch } => {
                self.gen_if(condition, then_branch, else_branch.as_deref());
            }
            Stmt::While { condition, body } => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                self.emit_label(&start_label);
                self.gen_expr(condition);
                self.emit("testq %rax, %rax");
                self.emit(&format!("jz {end_label}"));

                self.gen_stmt(body);
                self.emit(&format!("jmp {start_label}"));
                self.emit_label(&end_label);
            }
            Stmt::For { var, start, end, body } => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                self.gen_expr(start);
                self.store_variable(var, DataType::Int);

                self.emit_label(&start_label);
                self.load_variable(var);
                self.emit_push("rax");
                self.gen_expr(end);
                self.emit_pop("rbx");
                self.emit("cmpq %rax, %rbx");
                self.emit(&format!("jge {end_label}"));

                self.gen_stmt(body);

                self.load_variable(var);
                self.emit("incq %rax");
                self.store_variable(var, DataType::Int);

                self.emit(&format!("jmp {start_label}"));
                self.emit_label(&end_label);
            }
            Stmt::Block(statements) => {
                // slots were handed out during pre-declaration; no frame here
                for s in statements {
                    self.gen_stmt(s);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(expr) = value {
                    self.gen_expr(expr);
                }
                self.gen_epilogue();
            }
        }
    }

    fn gen_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        if self.eliminate_dead_branches {
            if let ExprKind::Literal { value } = &condition.kind {
                // unparsable texture (float or string literal) counts as true
                let val = value.parse::<i64>().unwrap_or(1);
                if val == 0 {
                    if let Some(els) = else_branch {
                        self.gen_stmt(els);
                    }
                } else {
                    self.gen_stmt(then_branch);
                }
                return;
            }
        }

        let else_label = self.new_label();
        let end_label = self.new_label();

        self.gen_expr(condition);
        self.emit("testq %rax, %rax");

        match else_branch {
            Some(els) => {
                self.emit(&format!("jz {else_label}"));
                self.gen_stmt(then_branch);
                self.emit(&format!("jmp {end_label}"));
                self.emit_label(&else_label);
                self.gen_stmt(els);
                self.emit_label(&end_label);
            }
            None => {
                self.emit(&format!("jz {end_label}"));
                self.gen_stmt(then_branch);
                self.emit_label(&end_label);
            }
        }
    }

    // --- expressions ---

    fn gen_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                if self.fold_constants {
                    if let Some(value) = fold_int(expr) {
                        self.emit(&format!("movq ${value}, %rax"));
                        return;
                    }
                }
                self.gen_binary(*op, left, right, expr.ty);
            }
            ExprKind::Unary { op, operand } => {
                self.gen_expr(operand);
                match op {
                    UnOp::Neg => {
                        if expr.ty == DataType::Float {
                            self.emit("movq %rax, %xmm0");
                            self.emit("xorpd %xmm1, %xmm1");
                            self.emit("subsd %xmm0, %xmm1");
                            self.emit("movq %xmm1, %rax");
                        } else {
                            self.emit("negq %rax");
                        }
                    }
                    UnOp::Not => {
                        self.emit("testq %rax, %rax");
                        self.emit("setz %al");
                        self.emit("movzbq %al, %rax");
                    }
                }
            }
            ExprKind::Ternary { condition, then_expr, else_expr } => {
                let false_label = self.new_label();
                let end_label = self.new_label();

                self.gen_expr(condition);
                self.emit("testq %rax, %rax");
                self.emit(&format!("jz {false_label}"));

                self.gen_expr(then_expr);
                self.emit(&format!("jmp {end_label}"));

                self.emit_label(&false_label);
                self.gen_expr(else_expr);
                self.emit_label(&end_label);
            }
            ExprKind::Literal { value } => match expr.ty {
                DataType::Float => {
                    let label = self.new_string_label();
                    let _ = writeln!(self.data, "{label}: .double {value}");
                    self.emit(&format!("movsd {label}(%rip), %xmm0"));
                    self.emit("movq %xmm0, %rax");
                }
                DataType::Str => {
                    let label = self.new_string_label();
                    let escaped = escape_string(value);
                    let _ = writeln!(self.data, "{label}: .asciz \"{escaped}\"");
                    self.emit(&format!("leaq {label}(%rip), %rax"));
                }
                _ => {
                    self.emit(&format!("movq ${value}, %rax"));
                }
            },
            ExprKind::Identifier { name } => {
                let name = name.clone();
                self.load_variable(&name);
            }
            ExprKind::ArrayAccess { array, indices } => {
                if let ExprKind::Identifier { name } = &array.kind {
                    let sym = match self.table.lookup(name) {
                        Some(s) => s.clone(),
                        None => return,
                    };
                    self.gen_array_address(&sym, indices);
                    self.emit("movq (%rbx), %rax");
                }
            }
            ExprKind::Call { name, args } => self.gen_call(name, args),
        }
    }

    fn gen_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, ty: DataType) {
        self.gen_expr(left);
        self.emit_push("rax");
        self.gen_expr(right);
        self.emit("movq %rax, %rbx");
        self.emit_pop("rax");

        if ty == DataType::Float {
            self.emit("movq %rax, %xmm0");
            self.emit("movq %rbx, %xmm1");
            match op {
                BinOp::Add => self.emit("addsd %xmm1, %xmm0"),
                BinOp::Sub => self.emit("subsd %xmm1, %xmm0"),
                BinOp::Mul => self.emit("mulsd %xmm1, %xmm0"),
                BinOp::Div => self.emit("divsd %xmm1, %xmm0"),
                _ => {}
            }
            self.emit("movq %xmm0, %rax");
            return;
        }

        match op {
            BinOp::Add => self.emit("addq %rbx, %rax"),
            BinOp::Sub => self.emit("subq %rbx, %rax"),
            BinOp::Mul => self.emit("imulq %rbx, %rax"),
            BinOp::Div => {
                self.emit("cqto");
                self.emit("idivq %rbx");
            }
            BinOp::Mod => {
                self.emit("cqto");
                self.emit("idivq %rbx");
                self.emit("movq %rdx, %rax");
            }
            BinOp::Eq | BinOp::Ne => {
                self.emit("cmpq %rbx, %rax");
                self.emit(if op == BinOp::Eq { "sete %al" } else { "setne %al" });
                self.emit("movzbq %al, %rax");
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                // the left operand's signedness picks the condition codes
                let unsigned = left.ty == DataType::Uint;
                let setcc = match (op, unsigned) {
                    (BinOp::Lt, false) => "setl %al",
                    (BinOp::Lt, true) => "setb %al",
                    (BinOp::Le, false) => "setle %al",
                    (BinOp::Le, true) => "setbe %al",
                    (BinOp::Gt, false) => "setg %al",
                    (BinOp::Gt, true) => "seta %al",
                    (BinOp::Ge, false) => "setge %al",
                    (BinOp::Ge, true) => "setae %al",
                    _ => unreachable!(),
                };
                self.emit("cmpq %rbx, %rax");
                self.emit(setcc);
                self.emit("movzbq %al, %rax");
            }
            // bitwise on the full operand values; no short circuit
            BinOp::And => self.emit("andq %rbx, %rax"),
            BinOp::Or => self.emit("orq %rbx, %rax"),
        }
    }

    // --- variables and arrays ---

    fn load_variable(&mut self, name: &str) {
        let (offset, ty) = match self.table.lookup(name) {
            Some(sym) => (sym.offset, sym.ty),
            None => return,
        };
        self.emit(&format!("movq {}, %rax", Self::mem(offset)));
        if ty == DataType::Float {
            self.emit("movq %rax, %xmm0");
        }
    }

    fn store_variable(&mut self, name: &str, ty: DataType) {
        let offset = match self.table.lookup(name) {
            Some(sym) => sym.offset,
            None => return,
        };
        if ty == DataType::Float {
            self.emit("movq %xmm0, %rax");
        }
        self.emit(&format!("movq %rax, {}", Self::mem(offset)));
    }

    /// Leave the element address in `%rbx`. Row-major offset, built
    /// iteratively so only the running total and one index are live.
    fn gen_array_address(&mut self, sym: &Symbol, indices: &[Expr]) {
        if indices.is_empty() {
            return;
        }

        self.gen_expr(&indices[0]);
        self.emit_push("rax");

        for (i, index) in indices.iter().enumerate().skip(1) {
            let dim_product: i64 = sym
                .array_dims
                .get(i..)
                .unwrap_or(&[])
                .iter()
                .product();

            self.emit_pop("rax");
            self.emit(&format!("imulq ${dim_product}, %rax"));
            self.emit_push("rax");

            self.gen_expr(index);
            self.emit_pop("rbx");
            self.emit("addq %rbx, %rax");
            self.emit_push("rax");
        }

        self.emit_pop("rax");
        self.emit("imulq $8, %rax");

        // a parameter array is a pointer to the caller's storage
        if sym.is_parameter {
            self.emit(&format!("movq {}, %rbx", Self::mem(sym.offset)));
        } else {
            self.emit(&format!("leaq {}, %rbx", Self::mem(sym.offset)));
        }
        self.emit("addq %rax, %rbx");
    }

    // --- calls ---

    fn gen_call(&mut self, name: &str, args: &[Expr]) {
        if name == "println" {
            if let Some(arg) = args.first() {
                self.gen_expr(arg);
                self.emit("movq %rax, %rsi");
                self.emit("leaq int_fmt(%rip), %rdi");
                self.emit("movl $0, %eax");
                self.call_aligned("printf@PLT", 0);
            }
            return;
        }

        if name == "printf" {
            let has_float_arg = args.iter().skip(1).any(|a| a.ty == DataType::Float);
            if has_float_arg && args.len() >= 2 {
                // one float value: format in rdi, value in xmm0, al = 1
                self.gen_expr(&args[1]);
                self.emit_push("rax");
                self.gen_expr(&args[0]);
                self.emit("movq %rax, %rdi");
                self.emit_pop("rax");
                self.emit("movq %rax, %xmm0");
                self.emit("movl $1, %eax");
                self.call_aligned("printf@PLT", 0);
                return;
            }

            let release = self.gen_args(args);
            self.emit("movl $0, %eax");
            self.call_aligned("printf@PLT", release);
            return;
        }

        let release = self.gen_args(args);
        self.call_aligned(name, release);
    }

    /// Evaluate arguments right to left, pushing each, then pop the first
    /// six into the argument registers. Stack-passed extras stay behind in
    /// ABI order; padding, when needed to keep the call site aligned, goes
    /// in first so it sits below them. Returns the number of qwords the
    /// call site must release afterwards.
    fn gen_args(&mut self, args: &[Expr]) -> usize {
        let extras = args.len().saturating_sub(ARG_REGS.len());
        let mut pad = 0;
        if (self.pushed + extras) % 2 == 1 {
            self.emit("subq $8, %rsp");
            self.pushed += 1;
            pad = 1;
        }

        for arg in args.iter().rev() {
            self.gen_expr(arg);
            self.emit_push("rax");
        }
        for reg in ARG_REGS.iter().take(args.len()) {
            self.emit_pop(reg);
        }

        extras + pad
    }

    /// Emit the call with `%rsp` 16-byte aligned, then release the stack
    /// arguments and padding that were left for it.
    fn call_aligned(&mut self, target: &str, mut release: usize) {
        if self.pushed % 2 == 1 {
            self.emit("subq $8, %rsp");
            self.pushed += 1;
            release += 1;
        }
        self.emit(&format!("call {target}"));
        if release > 0 {
            self.emit(&format!("addq ${}, %rsp", 8 * release));
            self.pushed -= release;
        }
    }

    fn convert_type(&mut self, from: DataType, to: DataType) {
        use DataType::*;
        if from == to {
            return;
        }
        match (from, to) {
            (Int | Long | Uint, Float) => self.emit("cvtsi2sdq %rax, %xmm0"),
            (Float, Int | Long | Uint) => self.emit("cvttsd2siq %xmm0, %rax"),
            (Int, Long) => self.emit("cltq"),
            (Uint, Long) => self.emit("movl %eax, %eax"),
            _ => {}
        }
    }
}

/// Evaluate an integer-literal subtree. `None` aborts the fold: a float or
/// string leaf, a non-arithmetic operator, or division by zero anywhere.
fn fold_int(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal { .. } if expr.ty != DataType::Float && expr.ty != DataType::Str => {
            expr.literal_int()
        }
        ExprKind::Binary { op, left, right }
            if op.is_arithmetic() && expr.ty != DataType::Float =>
        {
            let l = fold_int(left)?;
            let r = fold_int(right)?;
            Some(match op {
                BinOp::Add => l.wrapping_add(r),
                BinOp::Sub => l.wrapping_sub(r),
                BinOp::Mul => l.wrapping_mul(r),
                BinOp::Div if r != 0 => l.wrapping_div(r),
                BinOp::Mod if r != 0 => l.wrapping_rem(r),
                _ => return None,
            })
        }
        _ => None,
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}
