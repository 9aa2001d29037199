use tscope_core::Node;

/// Replace each maximal run of adjacent `is_member` nodes at one depth with
/// `summarize(run)`. A run ends on a non-member or a depth change.
pub(crate) fn fold_adjacent_runs<M, S>(nodes: Vec<Node>, is_member: M, summarize: S) -> Vec<Node>
where
    M: Fn(&Node) -> bool,
    S: Fn(Vec<Node>) -> Node,
{
    let mut out = Vec::with_capacity(nodes.len());
    let mut run: Vec<Node> = Vec::new();

    for node in nodes {
        if is_member(&node) {
            if run.first().is_some_and(|first| first.depth != node.depth) {
                out.push(summarize(std::mem::take(&mut run)));
            }
            run.push(node);
            continue;
        }
        if !run.is_empty() {
            out.push(summarize(std::mem::take(&mut run)));
        }
        out.push(node);
    }

    if !run.is_empty() {
        out.push(summarize(run));
    }
    out
}
