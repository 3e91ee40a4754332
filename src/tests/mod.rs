mod team_tests;
