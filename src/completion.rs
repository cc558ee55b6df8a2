//! Embedded shell completion scripts.
//!
//! The scripts are static strings so `--completion` never touches the
//! network and prints the same bytes on every run.

use crate::cli::Shell;

const BASH_COMPLETION: &str = r#"# bash completion for biathlon
_biathlon() {
    local cur prev subcommands
    cur="${COMP_WORDS[COMP_CWORD]}"
    prev="${COMP_WORDS[COMP_CWORD-1]}"
    subcommands="seasons events races results standings scores relay biathlete ceremony shooting cumulate"

    case "${prev}" in
        --completion)
            COMPREPLY=( $(compgen -W "bash zsh" -- "${cur}") )
            return 0
            ;;
        --sort)
            COMPREPLY=( $(compgen -W "result course range shooting penalty misses total sprint pursuit individual massstart startdate event country accuracy shots races name" -- "${cur}") )
            return 0
            ;;
        --discipline|-d)
            COMPREPLY=( $(compgen -W "individual sprint pursuit mass-start relay" -- "${cur}") )
            return 0
            ;;
    esac

    if [[ ${COMP_CWORD} -eq 1 ]]; then
        COMPREPLY=( $(compgen -W "${subcommands} --completion --version --help" -- "${cur}") )
        return 0
    fi

    case "${COMP_WORDS[1]}" in
        seasons)
            COMPREPLY=( $(compgen -W "--limit --tsv --help" -- "${cur}") )
            ;;
        events)
            COMPREPLY=( $(compgen -W "--season --level --search --sort --completed --tsv --help" -- "${cur}") )
            ;;
        races)
            COMPREPLY=( $(compgen -W "--event --season --level --discipline --tsv --help" -- "${cur}") )
            ;;
        results)
            COMPREPLY=( $(compgen -W "course range shooting --race --sort --country --top --first --limit --detail --tsv --help" -- "${cur}") )
            ;;
        standings|scores)
            COMPREPLY=( $(compgen -W "--season --men --level --sort --limit --tsv --help" -- "${cur}") )
            ;;
        relay)
            COMPREPLY=( $(compgen -W "--race --men --mixed --singlemixed --sort --detail --first --limit --tsv --help" -- "${cur}") )
            ;;
        biathlete)
            COMPREPLY=( $(compgen -W "info id results --id --search --season --level --tsv --help" -- "${cur}") )
            ;;
        ceremony)
            COMPREPLY=( $(compgen -W "--athlete --race --event --men --women --season --tsv --help" -- "${cur}") )
            ;;
        shooting)
            COMPREPLY=( $(compgen -W "--race --event --season --men --sort --top --limit --tsv --help" -- "${cur}") )
            ;;
        cumulate)
            COMPREPLY=( $(compgen -W "course ski range shooting penalty miss remontada --season --event --men --discipline --top --limit --tsv --help" -- "${cur}") )
            ;;
    esac
    return 0
}
complete -F _biathlon biathlon
"#;

const ZSH_COMPLETION: &str = r#"#compdef biathlon
# zsh completion for biathlon

_biathlon() {
    local -a subcommands
    subcommands=(
        'seasons:List seasons, newest first'
        'events:List the events of a season'
        'races:List the races of an event or a whole season'
        'results:Individual race results'
        'standings:Cup standings with per-discipline points'
        'relay:Relay team results'
        'biathlete:Athlete bios, id lookup, and season results'
        'ceremony:Podium placement counts'
        'shooting:Shooting accuracy aggregated over races'
        'cumulate:Per-athlete totals accumulated across races'
    )

    if (( CURRENT == 2 )); then
        _describe 'command' subcommands
        _arguments '--completion[print a shell completion script]:shell:(bash zsh)' \
                   '--version[show version]' '--help[show help]'
        return
    fi

    case "${words[2]}" in
        seasons)
            _arguments '--limit[maximum number of rows]:n:' '--tsv[tab-separated output]'
            ;;
        events)
            _arguments '--season[season id]:id:' '--level[competition level]:n:' \
                       '--search[match description or host]:text:' \
                       '--sort[sort order]:key:(startdate event country)' \
                       '--completed[finished events only]' '--tsv[tab-separated output]'
            ;;
        races)
            _arguments '--event[event id]:id:' '--season[season id]:id:' \
                       '--level[competition level]:n:' \
                       '--discipline[discipline]:code:(individual sprint pursuit mass-start relay)' \
                       '--tsv[tab-separated output]'
            ;;
        results)
            _arguments '1:breakdown:(course range shooting)' '--race[race id]:id:' \
                       '--sort[sort column]:key:(result course range shooting penalty misses)' \
                       '--country[nation code]:code:' '--top[top N of standings]:n:' \
                       '--first[first N finishers]:n:' '--limit[maximum number of rows]:n:' \
                       '--detail[per-stage shooting columns]' '--tsv[tab-separated output]'
            ;;
        standings|scores)
            _arguments '--season[season id]:id:' '--men[men instead of women]' \
                       '--level[competition level]:n:' \
                       '--sort[sort column]:key:(total sprint pursuit individual massstart)' \
                       '--limit[maximum number of rows]:n:' '--tsv[tab-separated output]'
            ;;
        relay)
            _arguments '--race[race id]:id:' '--men[men relay]' '--mixed[mixed relay]' \
                       '--singlemixed[single mixed relay]' \
                       '--sort[sort column]:key:(result course range shooting penalty misses)' \
                       '--detail[one row per leg]' '--first[first N teams]:n:' \
                       '--limit[maximum number of rows]:n:' '--tsv[tab-separated output]'
            ;;
        biathlete)
            _arguments '1:action:(info id results)' '--id[IBU ids]:ids:' \
                       '--search[name to search]:name:' '--season[season id]:id:' \
                       '--level[competition level]:n:' '--tsv[tab-separated output]'
            ;;
        ceremony)
            _arguments '--athlete[count per athlete]' '--race[race id]:id:' \
                       '--event[event id]:id:' '--men[men only]' '--women[women only]' \
                       '--season[season id]:id:' '--tsv[tab-separated output]'
            ;;
        shooting)
            _arguments '--race[race id]:id:' '--event[event id]:id:' \
                       '--season[season id]:id:' '--men[men instead of women]' \
                       '--sort[sort column]:key:(accuracy misses shots races name country)' \
                       '--top[top N of standings]:n:' \
                       '--limit[maximum number of rows]:n:' '--tsv[tab-separated output]'
            ;;
        cumulate)
            _arguments '1:kind:(course ski range shooting penalty miss remontada)' \
                       '--season[season id]:id:' '--event[event id]:id:' \
                       '--men[men instead of women]' \
                       '--discipline[discipline]:code:(individual sprint pursuit mass-start relay)' \
                       '--top[top N of standings]:n:' \
                       '--limit[maximum number of rows]:n:' '--tsv[tab-separated output]'
            ;;
    esac
}

_biathlon "$@"
"#;

/// The completion script for one shell.
pub fn completion_script(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash => BASH_COMPLETION,
        Shell::Zsh => ZSH_COMPLETION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_are_static() {
        assert_eq!(completion_script(Shell::Bash), completion_script(Shell::Bash));
        assert_eq!(completion_script(Shell::Zsh), completion_script(Shell::Zsh));
    }

    #[test]
    fn test_bash_script_mentions_every_subcommand() {
        let script = completion_script(Shell::Bash);
        for name in [
            "seasons",
            "events",
            "races",
            "results",
            "standings",
            "relay",
            "biathlete",
            "ceremony",
            "shooting",
            "cumulate",
        ] {
            assert!(script.contains(name), "missing {name}");
        }
        assert!(script.starts_with("# bash completion for biathlon"));
    }

    #[test]
    fn test_zsh_script_is_compdef() {
        assert!(completion_script(Shell::Zsh).starts_with("#compdef biathlon"));
    }
}
