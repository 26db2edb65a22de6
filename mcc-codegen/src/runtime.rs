//! Runtime support appended to every program
//!
//! `printf` takes its arguments on the stack the way every call does: the
//! format string address at `0($sp)`, the remaining arguments from `4($sp)`
//! on, doubles in 8-byte slots. Supported conversions are `%d`, `%c`, `%s`,
//! `%f` (double) and `%%`. It only touches `$s0..$s3`, `$a0`, `$v0` and
//! `$f12/$f13`.

/// Name the code generator calls for the print intrinsic
pub const PRINTF: &str = "printf";

const PRINTF_STUB: &str = "\
printf:
\tlw $s0, 0($sp)
\taddiu $s1, $sp, 4
__printf_loop:
\tlb $s2, 0($s0)
\tbeq $s2, $zero, __printf_done
\tli $s3, 37
\tbeq $s2, $s3, __printf_spec
\tmove $a0, $s2
\tli $v0, 11
\tsyscall
\taddiu $s0, $s0, 1
\tj __printf_loop
__printf_spec:
\tlb $s2, 1($s0)
\tbeq $s2, $zero, __printf_done
\taddiu $s0, $s0, 2
\tli $s3, 100
\tbeq $s2, $s3, __printf_int
\tli $s3, 99
\tbeq $s2, $s3, __printf_char
\tli $s3, 115
\tbeq $s2, $s3, __printf_str
\tli $s3, 102
\tbeq $s2, $s3, __printf_double
\tmove $a0, $s2
\tli $v0, 11
\tsyscall
\tj __printf_loop
__printf_int:
\tlw $a0, 0($s1)
\taddiu $s1, $s1, 4
\tli $v0, 1
\tsyscall
\tj __printf_loop
__printf_char:
\tlw $a0, 0($s1)
\taddiu $s1, $s1, 4
\tli $v0, 11
\tsyscall
\tj __printf_loop
__printf_str:
\tlw $a0, 0($s1)
\taddiu $s1, $s1, 4
\tli $v0, 4
\tsyscall
\tj __printf_loop
__printf_double:
\tlwc1 $f12, 0($s1)
\tlwc1 $f13, 4($s1)
\taddiu $s1, $s1, 8
\tli $v0, 3
\tsyscall
\tj __printf_loop
__printf_done:
\tjr $ra
";

/// The runtime block, printed verbatim after the program text
pub fn runtime_support() -> &'static str {
    PRINTF_STUB
}

/// Labels the runtime block defines
pub fn runtime_labels() -> impl Iterator<Item = &'static str> {
    PRINTF_STUB
        .lines()
        .filter(|line| !line.starts_with('\t'))
        .filter_map(|line| line.strip_suffix(':'))
}
