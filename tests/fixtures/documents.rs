//! LaTeX sources shared by the integration tests.

pub const BASIC: &str = "Hello $x=1$";

const PREAMBLE: &str = "\\documentclass{article}\n\\usepackage{amsmath}\n\\begin{document}\n";
const END: &str = "\\end{document}\n";

const HEAVY_BLOCK: &str = r"\section{Block}
\begin{theorem}
For every $n$ we have $n^2 \geq 0$.
\end{theorem}
\begin{equation}
A = \begin{pmatrix} 1 & 2 \\ 3 & 4 \end{pmatrix}
\end{equation}
\[ \sum_{i=1}^{n} i = \frac{n(n+1)}{2} \]
\begin{table}
\begin{tabular}{cc} a & b \\ c & d \end{tabular}
\end{table}
\begin{figure}
\includegraphics{plot.png}
\end{figure}
";

/// Ten repeated blocks of theorems, matrices, display math, tables and figures.
pub fn heavy_document() -> String {
    let mut doc = String::from(PREAMBLE);
    for _ in 0..10 {
        doc.push_str(HEAVY_BLOCK);
    }
    doc.push_str(END);
    doc
}

/// `sections` plain-prose sections of roughly `paragraph_chars` characters each.
pub fn long_document(sections: usize, paragraph_chars: usize) -> String {
    let mut doc = String::from(PREAMBLE);
    for i in 0..sections {
        doc.push_str(&format!("\\section{{Part {}}}\n", i + 1));
        doc.push_str(&"lorem ipsum ".repeat(paragraph_chars / 12 + 1));
        doc.push_str("\n\n");
    }
    doc.push_str(END);
    doc
}
