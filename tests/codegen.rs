use scc::{compile, CompileError, Options};

fn asm(code: &str) -> String {
    compile(code, &Options::default()).expect("program should compile")
}

fn asm_with(code: &str, options: Options) -> String {
    compile(code, &options).expect("program should compile")
}

#[test]
fn unit_shape_prelude_stub_and_data() {
    let out = asm("int main() { return 0; }");
    assert!(out.starts_with(".text\n.global main\n"));
    assert!(out.contains("main:"));
    assert!(out.contains("print_int:"));
    assert!(out.contains("int_fmt: .asciz \"%ld\\n\""));
    assert!(out.ends_with(".section .note.GNU-stack,\"\",@progbits\n"));
}

#[test]
fn prologue_and_epilogue_frame_the_function() {
    let out = asm("int main() { int x = 1; return x; }");
    assert!(out.contains("main:\n    pushq %rbp\n    movq %rsp, %rbp\n    subq $16, %rsp\n"));
    assert!(out.contains("    leave\n    ret\n"));
}

#[test]
fn empty_frame_skips_the_stack_reservation() {
    let out = asm("int main() { return 0; }");
    let main_block = out.split("print_int:").next().unwrap();
    assert!(!main_block.contains("subq $"));
}

#[test]
fn frame_size_is_rounded_to_sixteen_bytes() {
    // three 8-byte locals round up to 32
    let out = asm("int main() { int a = 1; int b = 2; int c = 3; return 0; }");
    assert!(out.contains("subq $32, %rsp"));
}

#[test]
fn locals_in_nested_bodies_get_slots_up_front() {
    let out = asm(
        "int main() { int a = 1; if (a) { int b = 2; } else { int c = 3; } while (a) { int d = 4; } return 0; }",
    );
    // a, b, c, d: 32 bytes
    assert!(out.contains("subq $32, %rsp"));
}

#[test]
fn constant_folding_collapses_nested_arithmetic() {
    let out = asm("int main() { printf(\"%d\\n\", 2 + 3 * 4); return 0; }");
    assert!(out.contains("movq $14, %rax"));
    assert!(!out.contains("imulq %rbx, %rax"));
    assert!(!out.contains("movq $3, %rax"));
}

#[test]
fn folding_can_be_disabled() {
    let out = asm_with(
        "int main() { printf(\"%d\\n\", 2 + 3 * 4); return 0; }",
        Options { fold_constants: false, eliminate_dead_branches: true },
    );
    assert!(!out.contains("movq $14, %rax"));
    assert!(out.contains("imulq %rbx, %rax"));
    assert!(out.contains("addq %rbx, %rax"));
}

#[test]
fn division_by_zero_aborts_the_fold() {
    let out = asm("int main() { return 1 / 0; }");
    assert!(out.contains("idivq %rbx"));
}

#[test]
fn dead_branch_elimination_keeps_only_the_taken_branch() {
    let out = asm(
        "int main() { if (1) { printf(\"%d\\n\", 1); } else { printf(\"%d\\n\", 2); } return 0; }",
    );
    assert!(out.contains("movq $1, %rax"));
    assert!(!out.contains("movq $2, %rax"));
    assert!(!out.contains("testq"));
}

#[test]
fn false_literal_keeps_only_the_else_branch() {
    let out = asm(
        "int main() { if (0) { printf(\"%d\\n\", 1); } else { printf(\"%d\\n\", 2); } return 0; }",
    );
    assert!(!out.contains("movq $1, %rax"));
    assert!(out.contains("movq $2, %rax"));
}

#[test]
fn dead_branch_elimination_can_be_disabled() {
    let out = asm_with(
        "int main() { if (1) { printf(\"%d\\n\", 1); } else { printf(\"%d\\n\", 2); } return 0; }",
        Options { fold_constants: true, eliminate_dead_branches: false },
    );
    assert!(out.contains("testq %rax, %rax"));
    assert!(out.contains("movq $1, %rax"));
    assert!(out.contains("movq $2, %rax"));
}

#[test]
fn if_without_else_falls_through() {
    let out = asm("int main() { int a = 1; if (a < 2) { a = 2; } return a; }");
    assert!(out.contains("jz .L"));
    assert!(out.contains("setl %al"));
}

#[test]
fn while_loop_tests_at_the_top() {
    let out = asm(
        "int main() { int i = 0; int total = 0; while (i < 5) { total = total + i; i = i + 1; } printf(\"%d\\n\", total); return 0; }",
    );
    assert!(out.contains(".L0:"));
    assert!(out.contains("jz .L1"));
    assert!(out.contains("jmp .L0"));
}

#[test]
fn for_loop_increments_by_one_and_exits_on_jge() {
    let out = asm("int main() { int s = 0; for (int j = 0; j < 10; j++) { s = s + j; } printf(\"%d\\n\", s); return 0; }");
    assert!(out.contains("cmpq %rax, %rbx"));
    assert!(out.contains("jge .L"));
    assert!(out.contains("incq %rax"));
}

#[test]
fn parameters_arrive_in_registers_and_spill_to_the_frame() {
    let out = asm(
        "int maximo(int a, int b, int c) { int m = (a > b) ? a : b; return (m > c) ? m : c; }\n\
         int main() { printf(\"%d\\n\", maximo(10, 20, 15)); return 0; }",
    );
    assert!(out.contains("movq %rdi, -8(%rbp)"));
    assert!(out.contains("movq %rsi, -16(%rbp)"));
    assert!(out.contains("movq %rdx, -24(%rbp)"));
    assert!(out.contains("call maximo"));
}

#[test]
fn recursion_emits_a_plain_call() {
    let out = asm(
        "int factorial(int n) { if (n <= 1) return 1; return n * factorial(n - 1); }\n\
         int main() { printf(\"%d\\n\", factorial(5)); return 0; }",
    );
    assert!(out.contains("factorial:"));
    assert!(out.contains("call factorial"));
    assert!(out.contains("setle %al"));
}

#[test]
fn call_under_a_pending_operand_push_is_padded() {
    // `n * factorial(n - 1)` holds one push across the call
    let out = asm(
        "int factorial(int n) { if (n <= 1) return 1; return n * factorial(n - 1); }\n\
         int main() { printf(\"%d\\n\", factorial(5)); return 0; }",
    );
    let call_site = out.find("call factorial").expect("recursive call present");
    let before = &out[..call_site];
    let pad = before.rfind("subq $8, %rsp").expect("padding before the call");
    assert!(call_site - pad < 400, "padding should belong to the call site");
    assert!(out.contains("addq $8, %rsp"));
}

#[test]
fn balanced_call_sites_are_not_padded() {
    let out = asm("int main() { printf(\"%d\\n\", 7); return 0; }");
    assert!(!out.contains("subq $8, %rsp"));
}

#[test]
fn println_routes_through_the_shared_format_string() {
    let out = asm("int main() { println(42); return 0; }");
    assert!(out.contains("movq %rax, %rsi"));
    assert!(out.contains("leaq int_fmt(%rip), %rdi"));
    assert!(out.contains("movl $0, %eax"));
    assert!(out.contains("call printf@PLT"));
}

#[test]
fn printf_arguments_fill_the_integer_registers_in_order() {
    let out = asm("int main() { printf(\"%d %d %d\\n\", 1, 2, 3); return 0; }");
    let rdi = out.find("popq %rdi").unwrap();
    let rsi = out.find("popq %rsi").unwrap();
    let rdx = out.find("popq %rdx").unwrap();
    let rcx = out.find("popq %rcx").unwrap();
    assert!(rdi < rsi && rsi < rdx && rdx < rcx);
    assert!(out.contains("movl $0, %eax"));
}

#[test]
fn printf_with_a_float_value_uses_xmm0_and_sets_al() {
    let out = asm("int main() { float f = 2.5; printf(\"%f\\n\", f); return 0; }");
    assert!(out.contains("movq %rax, %xmm0"));
    assert!(out.contains("movl $1, %eax"));
}

#[test]
fn string_literals_are_labeled_and_reescaped() {
    let out = asm("int main() { printf(\"a\\tb\\n\"); return 0; }");
    assert!(out.contains(".STR0: .asciz \"a\\tb\\n\""));
    assert!(out.contains("leaq .STR0(%rip), %rax"));
}

#[test]
fn float_literals_land_in_the_data_section() {
    let out = asm("int main() { float f = 2.5; return 0; }");
    assert!(out.contains(".STR0: .double 2.5"));
    assert!(out.contains("movsd .STR0(%rip), %xmm0"));
}

#[test]
fn integer_initializer_converts_into_a_float_variable() {
    let out = asm("int main() { float f = 1; return 0; }");
    assert!(out.contains("cvtsi2sdq %rax, %xmm0"));
}

#[test]
fn int_initializer_widens_into_long() {
    let out = asm("int main() { long x = 1; return 0; }");
    assert!(out.contains("cltq"));
}

#[test]
fn unsigned_comparison_uses_below_above_codes() {
    let out = asm(
        "int main() { unsigned int u = 1; if (u < 2) { printf(\"%d\\n\", 1); } return 0; }",
    );
    assert!(out.contains("setb %al"));
    assert!(!out.contains("setl %al"));
}

#[test]
fn logical_operators_are_bitwise_without_short_circuit() {
    let out = asm("int main() { int a = 1; if (a && 0) { a = 2; } if (a || 1) { a = 3; } return a; }");
    assert!(out.contains("andq %rbx, %rax"));
    assert!(out.contains("orq %rbx, %rax"));
}

#[test]
fn unary_operators_lower_to_neg_and_setz() {
    let out = asm("int main() { int a = 5; int b = -a; int c = !a; return b + c; }");
    assert!(out.contains("negq %rax"));
    assert!(out.contains("setz %al"));
}

#[test]
fn ternary_branches_through_fresh_labels() {
    let out = asm("int main() { int a = 1; int m = (a > 0) ? a : 0; return m; }");
    assert!(out.contains("jz .L0"));
    assert!(out.contains("jmp .L1"));
}

#[test]
fn modulo_takes_the_remainder_from_rdx() {
    let out = asm("int main() { int a = 7; int b = a % 3; return b; }");
    assert!(out.contains("cqto"));
    assert!(out.contains("movq %rdx, %rax"));
}

#[test]
fn multidimensional_access_scales_iteratively() {
    let out = asm("int main() { int g[2][3]; g[1][2] = 7; return g[1][2]; }");
    // second index scales the running total by the trailing dimension
    assert!(out.contains("imulq $3, %rax"));
    assert!(out.contains("imulq $8, %rax"));
    assert!(out.contains("leaq -48(%rbp), %rbx"));
    assert!(out.contains("movq %rax, (%rbx)"));
    assert!(out.contains("movq (%rbx), %rax"));
}

#[test]
fn parameter_arrays_are_dereferenced_pointers() {
    let out = asm(
        "int first(int data[]) { return data[0]; }\nint main() { int a[4]; a[0] = 9; return first(a); }",
    );
    assert!(out.contains("first:"));
    assert!(out.contains("movq -8(%rbp), %rbx"));
}

#[test]
fn void_functions_get_an_implicit_epilogue() {
    let out = asm("void noop() { }\nint main() { noop(); return 0; }");
    let noop_block: String = out.split("main:").next().unwrap().to_string();
    assert!(noop_block.contains("noop:"));
    assert!(noop_block.contains("leave"));
}

#[test]
fn functions_are_emitted_in_source_order() {
    let out = asm(
        "int one() { return 1; }\nint two() { return 2; }\nint main() { return one() + two(); }",
    );
    let one = out.find("one:").unwrap();
    let two = out.find("two:").unwrap();
    let main_pos = out.find("main:").unwrap();
    assert!(one < two && two < main_pos);
}

#[test]
fn semantic_failures_stop_before_code_generation() {
    let err = compile("int main() { return missing; }", &Options::default())
        .expect_err("undeclared identifier must fail");
    match &err {
        CompileError::Semantic(errors) => assert!(!errors.is_empty()),
        other => panic!("expected semantic failure, got {other}"),
    }
    assert!(err.to_string().contains("semantic error:"));
}

#[test]
fn parse_failures_are_fatal_and_carry_the_line() {
    let err = compile("int main() { if } ", &Options::default())
        .expect_err("bad syntax must fail");
    assert!(err.to_string().contains("parse error at line 1"));
}
